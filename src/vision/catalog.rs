// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Care-instruction catalog
//!
//! Maps the detector's class ids (0-48) to the care instruction each symbol
//! stands for. Built once at startup and shared read-only across requests.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of care symbols the detector is trained on
pub const CATALOG_SIZE: usize = 49;

/// Korean wording, as shown to end users of the label scanner
const KOREAN: [&str; CATALOG_SIZE] = [
    "물온도 30°C로 세탁하세요.",
    "물온도 40°C로 세탁하세요.",
    "물온도 50°C로 세탁하세요.",
    "물온도 60°C로 세탁하세요.",
    "물온도 70°C로 세탁하세요.",
    "물온도 95°C로 세탁하세요.",
    "표백제 사용 불가능해요.",
    "건조가 불가능해요.",
    "드라이클리닝이 불가능해요.",
    "다림질이 불가능해요.",
    "스팀 다림질이 불가능해요.",
    "기계 건조가 불가능해요.",
    "물세탁이 불가능해요.",
    "웨트클리닝이 불가능해요.",
    "비틀어 짜지 마세요.",
    "모든 표백제 사용 가능해요.",
    "염소계 표백제를 사용하세요.",
    "젖은 채로 줄에 널어서 건조하세요.",
    "젖은 채로 줄에 널어서 그늘에서 건조하세요.",
    "드라이클리닝이 가능해요.",
    "모든 용제로 드라이클리닝이 가능해요.",
    "퍼클로로에틸렌 용제로 드라이클리닝하세요.",
    "낮은 온도로 드라이클리닝하세요.",
    "스팀 없이 드라이클리닝하세요.",
    "탄화수소 용제로 드라이클리닝하세요.",
    "적은 수분으로 드라이클리닝하세요.",
    "짧은 시간 내로 드라이클리닝하세요.",
    "뉘어서 건조하세요.",
    "손세탁하세요.",
    "다림질이 가능해요.",
    "최고 온도 200˚C로 다림질하세요.",
    "최고 온도 100˚C로 다림질하세요.",
    "최고 온도 150˚C로 다림질하세요.",
    "걸어서 건조하세요.",
    "그늘에서 걸어서 건조하세요.",
    "매우 약하게 물세탁하세요.",
    "물세탁이 가능해요.",
    "약하게 물세탁하세요.",
    "자연건조하세요.",
    "비염소계 표백제를 사용하세요.",
    "그늘에서 건조하세요.",
    "스팀 다림질이 가능해요.",
    "높은 온도로 기계건조하세요.",
    "낮은 온도로 기계건조하세요.",
    "중간 온도로 기계건조하세요.",
    "열을 가하지 않고 기계건조하세요.",
    "기계 건조가 가능해요.",
    "웨트클리닝이 가능해요.",
    "약하게 비틀어 짜세요.",
];

const ENGLISH: [&str; CATALOG_SIZE] = [
    "Wash at 30°C.",
    "Wash at 40°C.",
    "Wash at 50°C.",
    "Wash at 60°C.",
    "Wash at 70°C.",
    "Wash at 95°C.",
    "Do not bleach.",
    "Do not dry.",
    "Do not dry clean.",
    "Do not iron.",
    "Do not steam iron.",
    "Do not tumble dry.",
    "Do not wash.",
    "Do not wet clean.",
    "Do not wring.",
    "Any bleach allowed.",
    "Use chlorine bleach.",
    "Line dry while wet (drip dry).",
    "Line dry while wet, in the shade.",
    "Dry clean allowed.",
    "Dry clean with any solvent.",
    "Dry clean with perchloroethylene.",
    "Dry clean at low temperature.",
    "Dry clean without steam.",
    "Dry clean with hydrocarbon solvent.",
    "Dry clean with reduced moisture.",
    "Dry clean with a short cycle.",
    "Dry flat.",
    "Hand wash.",
    "Iron allowed.",
    "Iron at a maximum of 200°C.",
    "Iron at a maximum of 100°C.",
    "Iron at a maximum of 150°C.",
    "Hang to dry.",
    "Hang to dry in the shade.",
    "Wash very gently.",
    "Washable in water.",
    "Wash gently.",
    "Air dry.",
    "Use non-chlorine bleach only.",
    "Dry in the shade.",
    "Steam iron allowed.",
    "Tumble dry on high heat.",
    "Tumble dry on low heat.",
    "Tumble dry on medium heat.",
    "Tumble dry with no heat.",
    "Tumble dry allowed.",
    "Wet clean allowed.",
    "Wring gently.",
];

/// Language the catalog descriptions are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogLanguage {
    #[default]
    Korean,
    English,
}

impl FromStr for CatalogLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ko" | "kr" | "korean" => Ok(Self::Korean),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unsupported catalog language '{}', supported: ko, en", other)),
        }
    }
}

impl fmt::Display for CatalogLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Korean => write!(f, "ko"),
            Self::English => write!(f, "en"),
        }
    }
}

/// Class id reported by the detector has no catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown care label class id {class_id} (catalog has {catalog_size} entries)")]
pub struct UnknownLabelError {
    pub class_id: u32,
    pub catalog_size: usize,
}

/// Immutable class id to care-instruction table
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    entries: Vec<String>,
}

impl LabelCatalog {
    /// Build the built-in 49-entry catalog in the given language
    pub fn new(language: CatalogLanguage) -> Self {
        let table = match language {
            CatalogLanguage::Korean => &KOREAN,
            CatalogLanguage::English => &ENGLISH,
        };
        Self::from_entries(table.iter().copied())
    }

    /// Build a catalog from arbitrary descriptions; entry `i` describes class `i`
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Description for `class_id`
    pub fn describe(&self, class_id: u32) -> Result<&str, UnknownLabelError> {
        self.entries
            .get(class_id as usize)
            .map(String::as_str)
            .ok_or(UnknownLabelError {
                class_id,
                catalog_size: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries as `(class_id, description)` pairs, in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, desc)| (id as u32, desc.as_str()))
    }
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self::new(CatalogLanguage::default())
    }
}
