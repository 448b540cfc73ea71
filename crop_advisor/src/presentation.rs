//! Crop catalogue and plain-text rendering of the form view.
//!
//! The catalogue is presentation data: farming tips, an emoji per crop and
//! the generic next steps shown with every recommendation. Unknown crops fall
//! back to defaults rather than failing.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::models::{CropInfo, Field, PredictionResult};
use crate::services::submission::{FormView, MessageKind, SubmissionState};
use crate::services::suitability::SuitabilityScore;

const DEFAULT_EMOJI: &str = "🌱";
const DEFAULT_TIPS_KEY: &str = "default";

/// Format a confidence in `[0, 1]` as a percentage with one decimal.
///
/// ```
/// assert_eq!(crop_advisor::presentation::format_confidence(0.87), "87.0%");
/// ```
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// Labelled lines of the crop information panel, in display order.
pub fn info_lines(info: &CropInfo) -> Vec<(&'static str, String)> {
    [
        ("Ideal Season", &info.season),
        ("Water Requirements", &info.water),
        ("Soil", &info.soil),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| (label, v.clone())))
    .collect()
}

/// Lookup tables used to decorate a recommendation.
#[derive(Debug, Clone)]
pub struct CropCatalog {
    tips: HashMap<String, Vec<String>>,
    emojis: HashMap<String, String>,
    next_steps: Vec<String>,
}

impl CropCatalog {
    pub fn tips_for(&self, crop: &str) -> &[String] {
        self.tips
            .get(&crop.to_lowercase())
            .or_else(|| self.tips.get(DEFAULT_TIPS_KEY))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_tips(&mut self, crop: &str, tips: Vec<String>) {
        self.tips.insert(crop.to_lowercase(), tips);
    }

    pub fn emoji_for(&self, crop: &str) -> &str {
        self.emojis
            .get(&crop.to_lowercase())
            .map(String::as_str)
            .unwrap_or(DEFAULT_EMOJI)
    }

    pub fn next_steps(&self) -> &[String] {
        &self.next_steps
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CropCatalog {
    fn default() -> Self {
        let tips = [
            (
                "rice",
                owned(&[
                    "Ensure fields are properly flooded for at least 5 cm water depth",
                    "Monitor for pest attacks, especially during growing season",
                    "Apply nitrogen fertilizer in 2-3 splits for better yield",
                    "Harvest when grain moisture drops to 12-14%",
                ]),
            ),
            (
                "maize",
                owned(&[
                    "Plant in well-prepared soil with good drainage",
                    "Ensure proper spacing (60-75 cm between rows)",
                    "Irrigate every 15-20 days during critical growth stages",
                    "Use certified seeds for better productivity",
                ]),
            ),
            (
                "wheat",
                owned(&[
                    "Plant in November-December for best results",
                    "Apply NPK fertilizer as per soil test recommendations",
                    "Harvest when moisture content drops to 12-14%",
                    "Protect from frost during grain development",
                ]),
            ),
            (
                "cotton",
                owned(&[
                    "Choose disease-resistant varieties suitable to your region",
                    "Maintain proper plant spacing for good air circulation",
                    "Monitor closely for pests like bollworms and spider mites",
                    "Use drip irrigation for water conservation",
                ]),
            ),
            (
                "banana",
                owned(&[
                    "Use healthy suckers for planting",
                    "Provide continuous irrigation, especially during dry season",
                    "Mulch the base to retain soil moisture",
                    "Apply organic manure every 3 months",
                ]),
            ),
            (
                "mango",
                owned(&[
                    "Pruning encourages better flowering and fruiting",
                    "Regular irrigation is essential during fruit development",
                    "Protect fruits from fruit flies using proper management",
                    "Harvest when fruit develops slight color change",
                ]),
            ),
            (
                DEFAULT_TIPS_KEY,
                owned(&[
                    "Always start with soil testing to know nutrient status",
                    "Practice crop rotation to maintain soil fertility",
                    "Use organic manure to improve soil structure",
                    "Monitor soil moisture and irrigate as needed",
                ]),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let emojis = [
            ("apple", "🍎"),
            ("banana", "🍌"),
            ("blackgram", "🫘"),
            ("chickpea", "🫘"),
            ("coconut", "🥥"),
            ("coffee", "☕"),
            ("cotton", "🧵"),
            ("grapes", "🍇"),
            ("jute", "🌾"),
            ("kidneybeans", "🫘"),
            ("lentil", "🫘"),
            ("maize", "🌽"),
            ("mango", "🥭"),
            ("mothbeans", "🫘"),
            ("mungbean", "🫘"),
            ("muskmelon", "🍈"),
            ("orange", "🍊"),
            ("papaya", "🧡"),
            ("pigeonpeas", "🫘"),
            ("pomegranate", "🍎"),
            ("rice", "🍚"),
            ("watermelon", "🍉"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            tips,
            emojis,
            next_steps: owned(&[
                "Prepare Soil: Based on the recommended crop requirements",
                "Get Seeds: From certified seed suppliers in your region",
                "Plan Irrigation: According to the water requirements",
                "Monitor Growth: Keep track of crop development",
                "Harvest: At the right time for maximum yield",
            ]),
        }
    }
}

/// Everything displayed for a successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub crop: String,
    pub emoji: String,
    pub confidence: Option<String>,
    pub info: Vec<(&'static str, String)>,
    pub tips: Vec<String>,
    pub next_steps: Vec<String>,
    pub suitability: SuitabilityScore,
}

impl ResultView {
    pub fn build(
        result: &PredictionResult,
        suitability: SuitabilityScore,
        catalog: &CropCatalog,
    ) -> Self {
        Self {
            crop: result.crop.clone(),
            emoji: catalog.emoji_for(&result.crop).to_string(),
            confidence: result.confidence.map(format_confidence),
            info: result.info.as_ref().map(info_lines).unwrap_or_default(),
            tips: catalog.tips_for(&result.crop).to_vec(),
            next_steps: catalog.next_steps().to_vec(),
            suitability,
        }
    }
}

/// Render the form view as plain text.
pub fn render_text(view: &FormView) -> String {
    let mut out = String::new();

    for field in Field::ALL {
        if let Some(error) = view.field_error(field) {
            let marker = if view.focus == Some(field) { ">" } else { " " };
            let _ = writeln!(out, "{} {}: {}", marker, field.wire_name(), error);
        }
    }

    if let Some(result) = &view.result {
        let _ = writeln!(out, "{} RECOMMENDED CROP: {}", result.emoji, result.crop.to_uppercase());
        if let Some(confidence) = &result.confidence {
            let _ = writeln!(out, "Confidence: {}", confidence);
        }
        let _ = writeln!(
            out,
            "Soil fit: {}%  Climate fit: {}%",
            result.suitability.soil, result.suitability.climate
        );
        if !result.info.is_empty() {
            let _ = writeln!(out, "\nCrop Growing Information");
            for (label, value) in &result.info {
                let _ = writeln!(out, "  {}: {}", label, value);
            }
        }
        if !result.tips.is_empty() {
            let _ = writeln!(out, "\nFarming Tips");
            for tip in &result.tips {
                let _ = writeln!(out, "  - {}", tip);
            }
        }
        let _ = writeln!(out, "\nNext Steps");
        for (i, step) in result.next_steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, step);
        }
    }

    if let Some(message) = &view.message {
        let prefix = match message.kind {
            MessageKind::Info => "",
            MessageKind::Success => "ok: ",
            MessageKind::Error => "error: ",
        };
        let _ = writeln!(out, "{}{}", prefix, message.text);
    }

    if view.state == SubmissionState::Submitting {
        let _ = writeln!(out, "(submitting...)");
    }

    out
}
