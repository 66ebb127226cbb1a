//! Crop cultivation specialist
//!
//! Keyword-topic dispatch over a small agronomy knowledge base. Advice is
//! keyed on the crop hint when one is given; evidence cites the guide the
//! recommendation came from.

use advisor_application::ports::specialist::{Specialist, SpecialistError};
use advisor_domain::{Evidence, SpecialistProfile, SpecialistResult, Urgency};
use async_trait::async_trait;

struct Guidance {
    crop: &'static str,
    advice: &'static str,
    source: &'static str,
    geo: &'static str,
}

impl Guidance {
    fn evidence(&self) -> Evidence {
        Evidence::new(self.source, self.advice)
            .with_geo(self.geo)
            .with_crop(self.crop)
    }
}

const IRRIGATION: &[Guidance] = &[
    Guidance {
        crop: "wheat",
        advice: "Wheat requires irrigation at crown root, tillering, jointing, flowering, and grain filling stages.",
        source: "wheat_irrigation_guide.pdf",
        geo: "Punjab",
    },
    Guidance {
        crop: "rice",
        advice: "Rice requires continuous water supply. Maintain 2-3 cm water level during the vegetative stage.",
        source: "icar_rice_guide.pdf",
        geo: "Karnataka",
    },
    Guidance {
        crop: "maize",
        advice: "Maize responds well to irrigation at knee-high, tasseling, and grain-filling stages. Avoid waterlogging.",
        source: "maize_irrigation.pdf",
        geo: "Bihar",
    },
];

const FERTILIZER: &[Guidance] = &[
    Guidance {
        crop: "wheat",
        advice: "Apply 60:40:40 kg/ha NPK for wheat. Split application: 50% at sowing, 25% at tillering, 25% at flowering.",
        source: "wheat_fertilizer_guide.pdf",
        geo: "Punjab",
    },
    Guidance {
        crop: "pulses",
        advice: "Apply 20:40:20 kg/ha NPK for pulses. Inoculate seeds with Rhizobium for better nitrogen fixation.",
        source: "pulses_fertilizer.pdf",
        geo: "Madhya Pradesh",
    },
];

const PEST: &[Guidance] = &[
    Guidance {
        crop: "cotton",
        advice: "Cotton bollworm control: apply Bt cotton or spray recommended insecticides at 5-7 day intervals.",
        source: "cotton_pest_guide.pdf",
        geo: "Gujarat",
    },
    Guidance {
        crop: "wheat",
        advice: "Monitor for yellow rust in wheat during February-March. Apply fungicide if disease severity exceeds 10%.",
        source: "wheat_disease_alert.pdf",
        geo: "Haryana",
    },
];

const PLANTING: &[Guidance] = &[
    Guidance {
        crop: "rice",
        advice: "Rice requires 120-150 days to mature. Transplant 25-30 day old seedlings at 20x15 cm spacing.",
        source: "icar_rice_guide.pdf",
        geo: "Karnataka",
    },
    Guidance {
        crop: "sugarcane",
        advice: "Sugarcane requires 12-18 months. Plant in February-March or September-October. Maintain soil moisture.",
        source: "sugarcane_calendar.pdf",
        geo: "Maharashtra",
    },
    Guidance {
        crop: "groundnut",
        advice: "Groundnut requires 90-120 days. Plant in June-July for kharif. Maintain spacing of 30x10 cm.",
        source: "groundnut_guide.pdf",
        geo: "Andhra Pradesh",
    },
];

enum Topic {
    Irrigation,
    Fertilizer,
    Pest,
    Planting,
    General,
}

impl Topic {
    fn classify(query: &str) -> Self {
        let contains = |words: &[&str]| words.iter().any(|w| query.contains(w));
        if contains(&["irrigation", "irrigate", "water"]) {
            Topic::Irrigation
        } else if contains(&["fertilizer", "fertiliser", "npk", "nutrient"]) {
            Topic::Fertilizer
        } else if contains(&["pest", "insect", "disease", "spray", "control"]) {
            Topic::Pest
        } else if contains(&["plant", "sow", "transplant", "spacing"]) {
            Topic::Planting
        } else {
            Topic::General
        }
    }
}

#[derive(Default)]
pub struct CropSpecialist;

impl CropSpecialist {
    pub fn new() -> Self {
        Self
    }

    fn answer(topic: &Topic, crop: Option<&str>) -> SpecialistResult {
        let (table, default_advice, urgency, confidence): (&[Guidance], &str, Urgency, f64) =
            match topic {
                Topic::Irrigation => (
                    IRRIGATION,
                    "Follow standard irrigation practices for your crop.",
                    Urgency::Medium,
                    0.8,
                ),
                Topic::Fertilizer => (
                    FERTILIZER,
                    "Apply balanced NPK fertilizers based on soil test results.",
                    Urgency::Medium,
                    0.9,
                ),
                Topic::Pest => (
                    PEST,
                    "Monitor for pests regularly and apply recommended pesticides when threshold levels are reached.",
                    Urgency::High,
                    0.85,
                ),
                Topic::Planting => (
                    PLANTING,
                    "Follow recommended planting practices for optimal crop establishment.",
                    Urgency::Medium,
                    0.8,
                ),
                Topic::General => {
                    return SpecialistResult::new(
                        "crop",
                        "Follow recommended agricultural practices for optimal crop production and yield.",
                        0.5,
                    )
                    .with_urgency(Urgency::Low);
                }
            };

        let hit = crop.and_then(|c| {
            let c = c.to_lowercase();
            table.iter().find(|g| g.crop == c)
        });
        match hit {
            Some(guidance) => SpecialistResult::new("crop", guidance.advice, confidence)
                .with_urgency(urgency)
                .with_evidence(vec![guidance.evidence()]),
            None => SpecialistResult::new("crop", default_advice, confidence).with_urgency(urgency),
        }
    }
}

#[async_trait]
impl Specialist for CropSpecialist {
    fn profile(&self) -> SpecialistProfile {
        SpecialistProfile::new(
            "crop",
            "Crop cultivation: irrigation schedules, fertilizer doses, pest and disease control, planting calendars",
        )
        .with_example("When should I irrigate my wheat?")
        .with_example("Which fertilizer dose for pulses?")
    }

    async fn process(
        &self,
        query: &str,
        _location: Option<&str>,
        crop: Option<&str>,
    ) -> Result<SpecialistResult, SpecialistError> {
        let topic = Topic::classify(&query.to_lowercase());
        Ok(Self::answer(&topic, crop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wheat_irrigation_has_evidence() {
        let result = CropSpecialist::new()
            .process("when should I irrigate", None, Some("wheat"))
            .await
            .unwrap();
        assert!(result.advice.contains("crown root"));
        assert_eq!(result.evidence.len(), 1);
        assert_eq!(result.evidence[0].crop.as_deref(), Some("wheat"));
    }

    #[tokio::test]
    async fn test_pest_queries_are_high_urgency() {
        let result = CropSpecialist::new()
            .process("how to control bollworm pest", None, Some("cotton"))
            .await
            .unwrap();
        assert_eq!(result.urgency, Urgency::High);
        assert!(result.confidence > 0.8);
    }

    #[tokio::test]
    async fn test_unknown_crop_gets_generic_topic_advice() {
        let result = CropSpecialist::new()
            .process("fertilizer recommendation", None, Some("dragonfruit"))
            .await
            .unwrap();
        assert!(result.advice.contains("NPK"));
        assert!(result.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_general_query_is_low_confidence() {
        let result = CropSpecialist::new()
            .process("tell me about farming", None, None)
            .await
            .unwrap();
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.urgency, Urgency::Low);
    }
}
