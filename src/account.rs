//! Account-level resources: account detail, profiles, userinfo,
//! push-notification channels, and availability queries.

use serde::{Deserialize, Serialize};

/// Detail information for the authenticated account.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub account_id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_tzid: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct AccountResponse {
    pub(crate) account: Account,
}

/// A calendar profile (one connected provider account).
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub provider_name: String,
    pub profile_id: String,
    pub profile_name: String,
    #[serde(default)]
    pub profile_connected: bool,
    /// Present when the profile has disconnected and needs relinking.
    #[serde(default)]
    pub profile_relink_url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ProfilesResponse {
    pub(crate) profiles: Vec<Profile>,
}

/// OpenID Connect userinfo for the authenticated account.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub sub: String,
    #[serde(rename = "cronofy.type", default)]
    pub cronofy_type: Option<String>,
}

/// A push-notification channel.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub channel_id: String,
    pub callback_url: String,
    #[serde(default)]
    pub filters: Option<ChannelFilters>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChannelResponse {
    pub(crate) channel: Channel,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChannelsResponse {
    pub(crate) channels: Vec<Channel>,
}

/// Restricts which changes a channel is notified about.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelFilters {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub only_managed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calendar_ids: Option<Vec<String>>,
}

/// The body of a channel create.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateChannelRequest {
    pub callback_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<ChannelFilters>,
}

impl CreateChannelRequest {
    pub fn new(callback_url: impl Into<String>) -> Self {
        Self {
            callback_url: callback_url.into(),
            filters: None,
        }
    }

    pub fn filters(mut self, filters: ChannelFilters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// The body of an availability query.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AvailabilityRequest {
    pub participants: Vec<ParticipantGroup>,
    pub required_duration: RequiredDuration,
    pub available_periods: Vec<AvailabilityPeriod>,
}

/// A group of accounts that must (or may) attend.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ParticipantGroup {
    pub members: Vec<Member>,

    /// How many of the group are needed: `"all"` or a count rendered as a
    /// string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
}

/// One account inside a participant group.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub sub: String,
}

/// The length of the slot being looked for.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequiredDuration {
    pub minutes: u32,
}

/// A candidate window supplied with the query.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AvailabilityPeriod {
    pub start: String,
    pub end: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct AvailabilityResponse {
    pub(crate) available_periods: Vec<AvailablePeriod>,
}

/// A period in which all required participants are free.
///
/// The bounds are the raw timestamp strings the API returned.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AvailablePeriod {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub participants: Vec<Member>,
}
