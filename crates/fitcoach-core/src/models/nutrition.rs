// ABOUTME: Nutrition estimate produced from a food photo
// ABOUTME: Accepts numbers or numeric strings from model output and rejects negatives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize};

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::custom(format!("invalid amount: {text}")))?,
    };

    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::custom(format!("invalid amount: {value}")))
    }
}

/// Estimated macro-nutrients of a meal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    /// Energy in kilocalories
    #[serde(deserialize_with = "deserialize_amount")]
    pub calories_kcal: f64,
    /// Protein in grams
    #[serde(deserialize_with = "deserialize_amount")]
    pub protein_g: f64,
    /// Carbohydrate in grams
    #[serde(deserialize_with = "deserialize_amount")]
    pub carb_g: f64,
    /// Fat in grams
    #[serde(deserialize_with = "deserialize_amount")]
    pub fat_g: f64,
}
