//! Government scheme and policy specialist
//!
//! Answers from a built-in scheme catalog (central schemes, bank credit
//! products, state subsidies). Application and eligibility questions get the
//! matching section of the catalog entry and raised urgency.

use advisor_application::ports::specialist::{Specialist, SpecialistError};
use advisor_domain::{Evidence, SpecialistProfile, SpecialistResult, Urgency};
use async_trait::async_trait;

struct Scheme {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    objective: &'static str,
    benefits: &'static str,
    eligibility: &'static str,
    how_to_apply: &'static str,
    geo: &'static str,
}

const SCHEMES: &[Scheme] = &[
    Scheme {
        id: "pm-kisan",
        name: "PM-KISAN",
        category: "central government",
        objective: "Income support for landholding farmer families",
        benefits: "₹6000 per year in three equal installments, paid directly to the bank account",
        eligibility: "All landholding farmer families with cultivable land",
        how_to_apply: "Register at pmkisan.gov.in or through the village patwari",
        geo: "India",
    },
    Scheme {
        id: "pmfby",
        name: "PMFBY (Pradhan Mantri Fasal Bima Yojana)",
        category: "central government",
        objective: "Crop insurance against natural calamities, pests, and diseases",
        benefits: "Insurance cover at 2% premium for kharif and 1.5% for rabi crops",
        eligibility: "All farmers growing notified crops, including sharecroppers",
        how_to_apply: "Enroll through your bank, CSC center, or pmfby.gov.in before the seasonal cutoff",
        geo: "India",
    },
    Scheme {
        id: "kcc",
        name: "Kisan Credit Card",
        category: "banking",
        objective: "Short-term credit for cultivation and allied activities",
        benefits: "Credit up to ₹3 lakh at subsidized interest, with prompt-repayment incentive",
        eligibility: "Farmers, tenant farmers, and self-help groups with a land record or cultivation proof",
        how_to_apply: "Apply at any commercial bank branch with land documents and identity proof",
        geo: "India",
    },
    Scheme {
        id: "pm-kmy",
        name: "PM Kisan Maandhan Yojana",
        category: "central government",
        objective: "Pension scheme for small and marginal farmers",
        benefits: "₹3000 monthly pension after age 60",
        eligibility: "Small and marginal farmers aged 18-40 with up to 2 hectares",
        how_to_apply: "Enroll at the nearest CSC center with Aadhaar and bank passbook",
        geo: "India",
    },
    Scheme {
        id: "sbi-gold-loan",
        name: "SBI Agri Gold Loan",
        category: "banking",
        objective: "Credit against gold ornaments for agricultural needs",
        benefits: "Loans up to ₹50 lakh at agricultural interest rates",
        eligibility: "Any farmer with gold ornaments and proof of agricultural activity",
        how_to_apply: "Visit an SBI branch with gold ornaments and land records",
        geo: "India",
    },
    Scheme {
        id: "tractor-loan",
        name: "Axis Bank Tractor Loan",
        category: "banking",
        objective: "Financing for tractor and farm machinery purchase",
        benefits: "Up to 90% financing with repayment aligned to harvest cycles",
        eligibility: "Farmers with at least 3 acres of agricultural land",
        how_to_apply: "Apply at an Axis Bank branch with land and income documents",
        geo: "India",
    },
    Scheme {
        id: "tn-organic",
        name: "TN Organic Farming Subsidy",
        category: "state government",
        objective: "Promote organic cultivation practices",
        benefits: "Subsidy on vermicompost units and organic input costs",
        eligibility: "Farmers in Tamil Nadu converting to certified organic cultivation",
        how_to_apply: "Apply through the block agriculture office",
        geo: "Tamil Nadu",
    },
    Scheme {
        id: "tn-mechanization",
        name: "TN Farm Mechanization Scheme",
        category: "state government",
        objective: "Subsidized farm machinery for small holdings",
        benefits: "40-50% subsidy on power tillers, rotavators, and sprayers",
        eligibility: "Tamil Nadu farmers with valid land records",
        how_to_apply: "Register on the TN agricultural machinery portal",
        geo: "Tamil Nadu",
    },
];

/// Query keywords to scheme ids
const KEYWORD_MAP: &[(&str, &[&str])] = &[
    ("pm-kisan", &["pm-kisan"]),
    ("pm kisan", &["pm-kisan"]),
    ("pension", &["pm-kmy"]),
    ("insurance", &["pmfby"]),
    ("fasal bima", &["pmfby"]),
    ("pmfby", &["pmfby"]),
    ("kisan credit", &["kcc"]),
    ("kcc", &["kcc"]),
    ("credit", &["kcc", "sbi-gold-loan", "tractor-loan"]),
    ("loan", &["kcc", "sbi-gold-loan", "tractor-loan"]),
    ("gold", &["sbi-gold-loan"]),
    ("tractor", &["tractor-loan"]),
    ("organic", &["tn-organic"]),
    ("machinery", &["tn-mechanization"]),
    ("mechanization", &["tn-mechanization"]),
    ("subsidy", &["tn-organic", "tn-mechanization"]),
];

const MAX_SCHEMES: usize = 3;

#[derive(Default)]
pub struct PolicySpecialist;

impl PolicySpecialist {
    pub fn new() -> Self {
        Self
    }

    fn matching_schemes(query: &str, location: Option<&str>) -> Vec<&'static Scheme> {
        let mut ids: Vec<&str> = Vec::new();
        for (keyword, scheme_ids) in KEYWORD_MAP {
            if query.contains(keyword) {
                for id in *scheme_ids {
                    if !ids.contains(id) {
                        ids.push(id);
                    }
                }
            }
        }

        if ids.is_empty() {
            let tn = location
                .map(|l| l.to_lowercase())
                .is_some_and(|l| l.contains("tamil nadu") || l == "tn");
            let category = if query.contains("bank") {
                "banking"
            } else if tn {
                "state government"
            } else {
                "central government"
            };
            ids.extend(
                SCHEMES
                    .iter()
                    .filter(|s| s.category == category)
                    .map(|s| s.id),
            );
        }

        SCHEMES
            .iter()
            .filter(|s| ids.contains(&s.id))
            .take(MAX_SCHEMES)
            .collect()
    }

    fn format_response(schemes: &[&'static Scheme], query: &str) -> SpecialistResult {
        let wants_application = ["apply", "application", "how to", "process", "form"]
            .iter()
            .any(|w| query.contains(w));
        let wants_eligibility = ["eligible", "eligibility", "qualify", "requirement"]
            .iter()
            .any(|w| query.contains(w));

        let mut advice = format!("Relevant agricultural schemes ({} found):", schemes.len());
        let mut evidence = Vec::new();
        for (i, scheme) in schemes.iter().enumerate() {
            advice.push_str(&format!("\n\n{}. {}", i + 1, scheme.name));
            if wants_application {
                advice.push_str(&format!("\nHow to apply: {}", scheme.how_to_apply));
            } else if wants_eligibility {
                advice.push_str(&format!("\nEligibility: {}", scheme.eligibility));
            } else {
                advice.push_str(&format!(
                    "\nBenefits: {}\nEligibility: {}",
                    scheme.benefits, scheme.eligibility
                ));
            }
            evidence.push(
                Evidence::new(
                    format!("{} - {}", scheme.category, scheme.name),
                    format!("{} | Benefits: {}", scheme.objective, scheme.benefits),
                )
                .with_geo(scheme.geo),
            );
        }

        let urgency = if wants_application || wants_eligibility {
            Urgency::High
        } else {
            Urgency::Medium
        };
        SpecialistResult::new("policy", advice, 0.9)
            .with_urgency(urgency)
            .with_evidence(evidence)
    }

    fn general_advice() -> SpecialistResult {
        SpecialistResult::new(
            "policy",
            "Multiple agricultural schemes are available including PM-KISAN (₹6000/year), \
             PMFBY (crop insurance), KCC (credit), and state-specific subsidies. Visit your \
             local agriculture office or the official portals for details.",
            0.6,
        )
        .with_urgency(Urgency::Low)
    }
}

#[async_trait]
impl Specialist for PolicySpecialist {
    fn profile(&self) -> SpecialistProfile {
        SpecialistProfile::new(
            "policy",
            "Government schemes, subsidies, crop insurance, and agricultural credit programs",
        )
        .with_example("Am I eligible for PM-KISAN?")
        .with_example("How do I apply for crop insurance?")
    }

    async fn process(
        &self,
        query: &str,
        location: Option<&str>,
        _crop: Option<&str>,
    ) -> Result<SpecialistResult, SpecialistError> {
        let query = query.to_lowercase();
        let schemes = Self::matching_schemes(&query, location);
        if schemes.is_empty() {
            return Ok(Self::general_advice());
        }
        Ok(Self::format_response(&schemes, &query))
    }
}
