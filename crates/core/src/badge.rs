use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification label attached to an article summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BadgeTag {
    HistoricDistrict,
    NrhpSite,
    HistoricHouse,
    Museum,
    ZooAquarium,
    University,
    Library,
    Airport,
    Stadium,
    Bridge,
    Waterfall,
    Dam,
    Lake,
    River,
    Mill,
    Theater,
    ReligiousSite,
    FortCastle,
    Monument,
    Market,
    TrailGreenway,
    FactoryMfg,
    Park,
    Neighborhood,
    County,
    StateProvince,
    Country,
    Place,
}

impl BadgeTag {
    pub const ADMIN: [BadgeTag; 3] = [BadgeTag::County, BadgeTag::StateProvince, BadgeTag::Country];

    pub fn label(self) -> &'static str {
        match self {
            BadgeTag::HistoricDistrict => "Historic district",
            BadgeTag::NrhpSite => "NRHP site",
            BadgeTag::HistoricHouse => "Historic house",
            BadgeTag::Museum => "Museum",
            BadgeTag::ZooAquarium => "Zoo/Aquarium",
            BadgeTag::University => "University",
            BadgeTag::Library => "Library",
            BadgeTag::Airport => "Airport",
            BadgeTag::Stadium => "Stadium",
            BadgeTag::Bridge => "Bridge",
            BadgeTag::Waterfall => "Waterfall",
            BadgeTag::Dam => "Dam",
            BadgeTag::Lake => "Lake",
            BadgeTag::River => "River",
            BadgeTag::Mill => "Mill",
            BadgeTag::Theater => "Theater",
            BadgeTag::ReligiousSite => "Religious site",
            BadgeTag::FortCastle => "Fort/Castle",
            BadgeTag::Monument => "Monument",
            BadgeTag::Market => "Market",
            BadgeTag::TrailGreenway => "Trail/Greenway",
            BadgeTag::FactoryMfg => "Factory/Mfg",
            BadgeTag::Park => "Park",
            BadgeTag::Neighborhood => "Neighborhood",
            BadgeTag::County => "County",
            BadgeTag::StateProvince => "State/Province",
            BadgeTag::Country => "Country",
            BadgeTag::Place => "Place",
        }
    }

    pub fn is_admin(self) -> bool {
        Self::ADMIN.contains(&self)
    }

    /// General-interest weight used as the base of a POI score.
    pub fn base_weight(self) -> f64 {
        match self {
            BadgeTag::HistoricDistrict | BadgeTag::NrhpSite => 7.0,
            BadgeTag::Museum | BadgeTag::Park | BadgeTag::University => 6.0,
            BadgeTag::Stadium | BadgeTag::Airport | BadgeTag::ZooAquarium | BadgeTag::FortCastle => {
                5.0
            }
            BadgeTag::HistoricHouse
            | BadgeTag::Theater
            | BadgeTag::Monument
            | BadgeTag::Waterfall
            | BadgeTag::Bridge
            | BadgeTag::Library => 4.0,
            BadgeTag::Lake
            | BadgeTag::River
            | BadgeTag::Dam
            | BadgeTag::Mill
            | BadgeTag::ReligiousSite
            | BadgeTag::TrailGreenway
            | BadgeTag::Market
            | BadgeTag::FactoryMfg => 3.0,
            BadgeTag::Neighborhood
            | BadgeTag::County
            | BadgeTag::StateProvince
            | BadgeTag::Country => 2.0,
            BadgeTag::Place => 1.0,
        }
    }
}

impl fmt::Display for BadgeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
