//! Farm finance specialist
//!
//! Session-aware cost optimization adviser. Financial figures are collected
//! across turns into a per-session form; until the required fields are known
//! the specialist answers with an incomplete-data request (which keeps the
//! conversation pinned to it), then produces a cost analysis. The analysis
//! is written by the language model when one is available, deterministic
//! otherwise.

use advisor_application::ports::language_model::LanguageModel;
use advisor_application::ports::specialist::{SessionAwareSpecialist, SpecialistError};
use advisor_domain::{Evidence, SpecialistProfile, SpecialistResult, Urgency};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Financial figures collected for one session
#[derive(Debug, Clone, Default)]
struct FinancialForm {
    land_size_acres: Option<f64>,
    annual_production_quintals: Option<f64>,
    fertilizer_cost: Option<f64>,
    water_cost: Option<f64>,
    selling_price: Option<f64>,
}

impl FinancialForm {
    /// Required fields for a meaningful analysis; selling price is optional
    fn missing(&self) -> Vec<(&'static str, &'static str)> {
        let mut missing = Vec::new();
        if self.land_size_acres.is_none() {
            missing.push(("land_size_acres", "What is your farm size in acres?"));
        }
        if self.annual_production_quintals.is_none() {
            missing.push((
                "annual_production_quintals",
                "What is your annual production in quintals?",
            ));
        }
        if self.fertilizer_cost.is_none() {
            missing.push(("fertilizer_cost", "How much do you spend on fertilizer per year (INR)?"));
        }
        if self.water_cost.is_none() {
            missing.push((
                "water_cost",
                "How much do you spend on water or irrigation per year (INR)?",
            ));
        }
        missing
    }

    fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Number preceded or followed by a context keyword within a short window
struct FieldPattern {
    before: Regex,
    after: Regex,
}

impl FieldPattern {
    fn new(keyword_alternation: &str, unit_alternation: Option<&str>) -> Self {
        let unit = unit_alternation.map(|u| format!(r"\s*(?:{})", u)).unwrap_or_default();
        Self {
            // "spend 30000 on fertilizer"
            before: Regex::new(&format!(
                r"(\d[\d,]*(?:\.\d+)?){}\D{{0,40}}(?:{})",
                unit, keyword_alternation
            ))
            .unwrap(),
            // "fertilizer cost is 30000"
            after: Regex::new(&format!(
                r"(?:{})\D{{0,40}}?(\d[\d,]*(?:\.\d+)?){}",
                keyword_alternation, unit
            ))
            .unwrap(),
        }
    }

    fn capture(&self, text: &str) -> Option<f64> {
        let raw = self
            .before
            .captures(text)
            .or_else(|| self.after.captures(text))?
            .get(1)?
            .as_str()
            .replace(',', "");
        raw.parse().ok()
    }
}

struct Extractor {
    land: Regex,
    production: Regex,
    fertilizer: FieldPattern,
    water: FieldPattern,
    price: FieldPattern,
}

impl Extractor {
    fn new() -> Self {
        Self {
            land: Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*(?:acres?|hectares?)").unwrap(),
            production: Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*(?:quintals?|tons?|tonnes?)").unwrap(),
            fertilizer: FieldPattern::new("fertilizer|fertiliser", None),
            water: FieldPattern::new("water|irrigation", None),
            price: FieldPattern::new("price|sell|selling|per quintal", None),
        }
    }

    fn single_capture(re: &Regex, text: &str) -> Option<f64> {
        re.captures(text)?
            .get(1)?
            .as_str()
            .replace(',', "")
            .parse()
            .ok()
    }

    fn absorb(&self, form: &mut FinancialForm, query: &str) {
        if let Some(v) = Self::single_capture(&self.land, query) {
            form.land_size_acres = Some(v);
        }
        if let Some(v) = Self::single_capture(&self.production, query) {
            form.annual_production_quintals = Some(v);
        }
        if let Some(v) = self.fertilizer.capture(query) {
            form.fertilizer_cost = Some(v);
        }
        if let Some(v) = self.water.capture(query) {
            form.water_cost = Some(v);
        }
        if let Some(v) = self.price.capture(query) {
            form.selling_price = Some(v);
        }
    }
}

pub struct FinanceSpecialist {
    forms: Mutex<HashMap<String, FinancialForm>>,
    extractor: Extractor,
    model: Option<Arc<dyn LanguageModel>>,
}

impl FinanceSpecialist {
    pub fn new() -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            extractor: Extractor::new(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    fn request_data(form: &FinancialForm) -> SpecialistResult {
        let missing = form.missing();
        let mut prompt =
            String::from("To analyze your farm finances I need a few details:\n");
        for (i, (_, question)) in missing.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, question));
        }
        let fields = missing.iter().map(|(f, _)| f.to_string()).collect();

        SpecialistResult::new("finance", prompt.trim_end(), 0.5)
            .with_urgency(Urgency::Medium)
            .needs_input(fields, "Please share the figures above so I can run the numbers.")
    }

    fn deterministic_analysis(form: &FinancialForm) -> String {
        // missing() guarantees these are set once the form completes
        let land = form.land_size_acres.unwrap_or_default();
        let production = form.annual_production_quintals.unwrap_or_default();
        let fertilizer = form.fertilizer_cost.unwrap_or_default();
        let water = form.water_cost.unwrap_or_default();

        let total_cost = fertilizer + water;
        let cost_per_acre = if land > 0.0 { total_cost / land } else { 0.0 };
        let yield_per_acre = if land > 0.0 { production / land } else { 0.0 };

        let mut analysis = format!(
            "Farm finance summary for {:.1} acres:\n\
             - Tracked annual input cost: ₹{:.0} (fertilizer ₹{:.0}, water ₹{:.0})\n\
             - Cost per acre: ₹{:.0}\n\
             - Yield: {:.1} quintals/acre",
            land, total_cost, fertilizer, water, cost_per_acre, yield_per_acre
        );

        if let Some(price) = form.selling_price {
            let revenue = production * price;
            analysis.push_str(&format!(
                "\n- Estimated revenue: ₹{:.0} at ₹{:.0}/quintal (margin ₹{:.0} before other costs)",
                revenue,
                price,
                revenue - total_cost
            ));
        }

        if land > 0.0 && fertilizer / land > 8000.0 {
            analysis.push_str(
                "\n\nYour fertilizer spend per acre is above typical levels; a soil test \
                 and split application could reduce it by 15-20%.",
            );
        } else {
            analysis.push_str(
                "\n\nCosts look reasonable. Consider drip irrigation subsidies and direct \
                 procurement to improve the margin further.",
            );
        }
        analysis
    }

    async fn analyze(&self, form: &FinancialForm, query: &str) -> String {
        let deterministic = Self::deterministic_analysis(form);
        if let Some(model) = &self.model {
            let prompt = format!(
                "You are a farm finance adviser. The farmer asked: {}\n\nData:\n{}\n\n\
                 Rewrite this as clear, encouraging advice with concrete next steps.",
                query, deterministic
            );
            match model.generate(&prompt).await {
                Ok(text) => return text,
                Err(e) => warn!("finance analysis call failed: {}", e),
            }
        }
        deterministic
    }
}

impl Default for FinanceSpecialist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionAwareSpecialist for FinanceSpecialist {
    fn profile(&self) -> SpecialistProfile {
        SpecialistProfile::new(
            "finance",
            "Farm economics: cost optimization, input spend analysis, profitability and credit planning",
        )
        .with_example("Help me reduce my farming costs")
        .with_example("Is my fertilizer spend too high?")
    }

    async fn process(
        &self,
        query: &str,
        _location: Option<&str>,
        _crop: Option<&str>,
        session_id: &str,
    ) -> Result<SpecialistResult, SpecialistError> {
        let form = {
            let mut forms = self.forms.lock().await;
            let form = forms.entry(session_id.to_string()).or_default();
            self.extractor.absorb(form, &query.to_lowercase());
            form.clone()
        };

        if !form.is_complete() {
            debug!(session_id, missing = form.missing().len(), "finance form incomplete");
            return Ok(Self::request_data(&form));
        }

        let advice = self.analyze(&form, query).await;
        let excerpt = format!(
            "land={:.1} acres, production={:.1} quintals, fertilizer=₹{:.0}, water=₹{:.0}",
            form.land_size_acres.unwrap_or_default(),
            form.annual_production_quintals.unwrap_or_default(),
            form.fertilizer_cost.unwrap_or_default(),
            form.water_cost.unwrap_or_default()
        );
        Ok(SpecialistResult::new("finance", advice, 0.85)
            .with_urgency(Urgency::Medium)
            .with_evidence(vec![Evidence::new("farmer-provided figures", excerpt)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_query_requests_missing_fields() {
        let specialist = FinanceSpecialist::new();
        let result = specialist
            .process("help me cut my farming costs", None, None, "s1")
            .await
            .unwrap();
        let incomplete = result.incomplete_data.expect("should request data");
        assert_eq!(incomplete.missing.len(), 4);
        assert!(result.advice.contains("1. What is your farm size in acres?"));
    }

    #[tokio::test]
    async fn test_figures_accumulate_across_turns() {
        let specialist = FinanceSpecialist::new();
        specialist
            .process("my farm is 5 acres and I produce 80 quintals", None, None, "s1")
            .await
            .unwrap();
        let result = specialist
            .process(
                "I spend 30000 on fertilizer and 10000 on irrigation",
                None,
                None,
                "s1",
            )
            .await
            .unwrap();
        assert!(result.incomplete_data.is_none());
        assert!(result.advice.contains("5.0 acres"));
        assert!(result.advice.contains("₹40000"));
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_forms() {
        let specialist = FinanceSpecialist::new();
        specialist
            .process("my farm is 5 acres", None, None, "s1")
            .await
            .unwrap();
        let other = specialist
            .process("what are my costs", None, None, "s2")
            .await
            .unwrap();
        let incomplete = other.incomplete_data.expect("fresh session starts empty");
        assert!(incomplete.missing.contains(&"land_size_acres".to_string()));
    }

    #[test]
    fn test_extractor_reads_cost_phrases_in_both_orders() {
        let extractor = Extractor::new();
        let mut form = FinancialForm::default();
        extractor.absorb(&mut form, "fertilizer cost is 25,000 and I spend 8000 on water");
        assert_eq!(form.fertilizer_cost, Some(25000.0));
        assert_eq!(form.water_cost, Some(8000.0));
    }

    #[test]
    fn test_high_fertilizer_spend_triggers_suggestion() {
        let form = FinancialForm {
            land_size_acres: Some(2.0),
            annual_production_quintals: Some(30.0),
            fertilizer_cost: Some(25000.0),
            water_cost: Some(5000.0),
            selling_price: None,
        };
        let analysis = FinanceSpecialist::deterministic_analysis(&form);
        assert!(analysis.contains("soil test"));
    }
}
