//! LoRa region codes.
//!
//! Nodes report the regulatory region their radio is configured for. Some
//! regions limit transmit airtime to a percentage of each hour; an unlicensed
//! operator in one of those regions gets a duty-cycle notice at the top of
//! the radio configuration section.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Regulatory region as reported in a node's LoRa config.
///
/// Variants follow the firmware's region enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionCode {
    /// Region not set yet; the radio will not transmit.
    #[default]
    Unset,
    Us,
    #[serde(rename = "EU_433")]
    Eu433,
    #[serde(rename = "EU_868")]
    Eu868,
    Cn,
    Jp,
    Anz,
    Kr,
    Tw,
    Ru,
    In,
    #[serde(rename = "NZ_865")]
    Nz865,
    Th,
    #[serde(rename = "LORA_24")]
    Lora24,
    #[serde(rename = "UA_433")]
    Ua433,
    #[serde(rename = "UA_868")]
    Ua868,
    #[serde(rename = "MY_433")]
    My433,
    #[serde(rename = "MY_919")]
    My919,
    #[serde(rename = "SG_923")]
    Sg923,
}

impl RegionCode {
    /// Hourly duty cycle limit as a percentage.
    ///
    /// 100 means unrestricted; 0 is reported for [`RegionCode::Unset`].
    pub fn duty_cycle_percent(self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::Eu433 | Self::Eu868 | Self::Ua433 => 10,
            Self::Ua868 => 1,
            _ => 100,
        }
    }

    /// Whether transmissions in this region are duty-cycle restricted.
    pub fn is_duty_cycle_restricted(self) -> bool {
        let duty = self.duty_cycle_percent();
        duty > 0 && duty < 100
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unset => "UNSET",
            Self::Us => "US",
            Self::Eu433 => "EU_433",
            Self::Eu868 => "EU_868",
            Self::Cn => "CN",
            Self::Jp => "JP",
            Self::Anz => "ANZ",
            Self::Kr => "KR",
            Self::Tw => "TW",
            Self::Ru => "RU",
            Self::In => "IN",
            Self::Nz865 => "NZ_865",
            Self::Th => "TH",
            Self::Lora24 => "LORA_24",
            Self::Ua433 => "UA_433",
            Self::Ua868 => "UA_868",
            Self::My433 => "MY_433",
            Self::My919 => "MY_919",
            Self::Sg923 => "SG_923",
        };
        f.write_str(name)
    }
}
