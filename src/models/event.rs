use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ticket::EventTicketSummary;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct EventId(pub i32);

impl From<EventId> for i32 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

macro_rules! venues {
    ($($name:ident),+ $(,)?) => {
        /// The closed set of venues an event can be held at.
        ///
        /// Serialized by name; persisted as the integer discriminant, so new
        /// venues must only ever be appended.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[repr(i32)]
        pub enum Venue {
            $($name),+
        }

        impl Venue {
            pub const ALL: &'static [Venue] = &[$(Venue::$name),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Venue::$name => stringify!($name)),+
                }
            }
        }
    };
}

venues! {
    ScotiabankArena,
    MasseyHall,
    DanforthMusicHall,
    BellCentre,
    RogersArena,
    Saddledome,
    MTSCentre,
    BudweiserGardens,
    PlaceBell,
    CentreVideotron,
    RogersPlace,
    ScotiabankSaddledome,
    SaveOnFoodsMemorialCentre,
    MileOneCentre,
    AvenirCentre,
    FirstOntarioCentre,
    LeonCentre,
    MeridianCentre,
    AbbotsfordCentre,
    CNCentre,
    EnmaxCentre,
    MosaicPlace,
    SandmanCentre,
    SouthOkanaganEventsCentre,
    WestobaPlace,
    KeystoneCentre,
    TCUPlace,
    SaskTelCentre,
    BrandtCentre,
    CreditUnionCentre,
    BellMTSPlace,
    BellAliantCentre,
    EastlinkCentre,
    HarbourStation,
    MonctonColiseum,
    MileOneStadium,
    PepsiCentre,
    RathEastlinkCommunityCentre,
    ScotiabankCentre,
    SleemanCentre,
    WindsorFamilyCreditUnionCentre,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown venue: {0}")]
pub struct UnknownVenue(pub String);

impl FromStr for Venue {
    type Err = UnknownVenue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Venue::ALL
            .iter()
            .copied()
            .find(|venue| venue.as_str() == s)
            .ok_or_else(|| UnknownVenue(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Event {
    pub event_id: EventId,
    pub name: String,
    pub description: String,
    pub venue: Venue,
    #[sqlx(rename = "event_date")]
    pub date: DateTime<Utc>,
    pub total_tickets: i32,
}

impl Event {
    pub fn from_draft(event_id: EventId, draft: EventDraft) -> Self {
        Self {
            event_id,
            name: draft.name,
            description: draft.description,
            venue: draft.venue,
            date: draft.date,
            total_tickets: draft.total_tickets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub venue: Venue,
    pub date: DateTime<Utc>,
    pub total_tickets: i32,
}

/// An event with the tickets issued for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub tickets: Vec<EventTicketSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_names_round_trip_through_from_str() {
        for venue in Venue::ALL {
            assert_eq!(venue.as_str().parse::<Venue>(), Ok(*venue));
        }
    }

    #[test]
    fn test_venue_discriminants_follow_declaration_order() {
        assert_eq!(Venue::ALL.len(), 41);
        assert_eq!(Venue::ScotiabankArena as i32, 0);
        assert_eq!(Venue::MasseyHall as i32, 1);
        assert_eq!(Venue::WindsorFamilyCreditUnionCentre as i32, 40);
    }

    #[test]
    fn test_unknown_venue_is_rejected() {
        let err = "Madison Square Garden".parse::<Venue>().unwrap_err();
        assert_eq!(err.to_string(), "unknown venue: Madison Square Garden");
    }

    #[test]
    fn test_venue_serializes_by_name() {
        let json = serde_json::to_string(&Venue::MasseyHall).unwrap();
        assert_eq!(json, "\"MasseyHall\"");
    }
}
