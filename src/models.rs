//! Data models for the Pricing Engine.
//!
//! The `models` module defines the serialisable value objects that flow
//! into and out of the engine: revenue figures, contract options,
//! pricing results and the Launch/Scale comparison records.  None of
//! them carry identity; they are built fresh for every calculation.
//! Field names are camelCase on the wire because the calculator
//! components consuming them are JavaScript.

use crate::error::PricingError;
use serde::{Deserialize, Serialize};

/// The three service channels a customer earns revenue through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Garage,
    Shop,
    Mobile,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Garage, Service::Shop, Service::Mobile];
}

/// Annual revenue per service channel, in EUR.
///
/// Every component must be a non-negative finite number.  The engine
/// does not check this; see [`RevenueFigures::validate`] for callers
/// that accept untrusted input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueFigures {
    pub garage: f64,
    pub shop: f64,
    pub mobile: f64,
}

impl RevenueFigures {
    pub fn new(garage: f64, shop: f64, mobile: f64) -> Self {
        Self { garage, shop, mobile }
    }

    /// Revenue attributed to a single service.
    pub fn get(&self, service: Service) -> f64 {
        match service {
            Service::Garage => self.garage,
            Service::Shop => self.shop,
            Service::Mobile => self.mobile,
        }
    }

    /// Rejects negative, NaN or infinite components.
    pub fn validate(&self) -> Result<(), PricingError> {
        for service in Service::ALL {
            let value = self.get(service);
            if !value.is_finite() || value < 0.0 {
                return Err(PricingError::InvalidInput(format!(
                    "{:?} revenue must be a non-negative finite number, got {}",
                    service, value
                )));
            }
        }
        Ok(())
    }
}

/// Billing commitment length.  Longer commitments earn a discount on
/// usage cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    #[default]
    None,
    Monthly,
    Yearly,
}

/// Options controlling a single [`PricingResult`] calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingOptions {
    /// Whether mobile revenue counts towards the tier and is charged.
    pub include_mobile: bool,
    pub contract_type: ContractType,
}

impl Default for PricingOptions {
    fn default() -> Self {
        Self {
            include_mobile: true,
            contract_type: ContractType::None,
        }
    }
}

/// Input to a pricing calculation: revenue plus options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRequest {
    pub revenues: RevenueFigures,
    pub options: PricingOptions,
}

/// Per-service monetary amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceBreakdown {
    pub garage: f64,
    pub shop: f64,
    pub mobile: f64,
}

impl ServiceBreakdown {
    pub fn set(&mut self, service: Service, amount: f64) {
        match service {
            Service::Garage => self.garage = amount,
            Service::Shop => self.shop = amount,
            Service::Mobile => self.mobile = amount,
        }
    }

    pub fn sum(&self) -> f64 {
        self.garage + self.shop + self.mobile
    }
}

/// The outcome of pricing one customer's revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    /// Usage cost per service before the contract discount.
    pub usage: ServiceBreakdown,
    /// Total cost after the contract discount.
    pub total: f64,
    /// `total` as a percentage of total revenue; 0 when there is no
    /// revenue.
    pub effective_rate: f64,
    /// Amount saved by the contract discount.
    pub discount: f64,
    pub garage_cost: f64,
    pub shop_cost: f64,
    pub mobile_cost: f64,
    pub tier: u8,
    /// Revenue used for tier detection (mobile only when included).
    pub total_revenue: f64,
}

/// Commercial terms of the Launch plan: a flat yearly fee plus a single
/// percentage of revenue.  Only offered to single-location customers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    pub fixed_cost_yearly: f64,
    /// Take rate in percent (e.g. `3.0` for 3%).
    pub revenue_percentage: f64,
}

/// Baseline Scale terms, applied when the tier table has nothing for
/// the detected tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleConfig {
    /// Yearly fixed fee per location.
    pub fixed_cost_yearly: f64,
    /// Take rate in percent.
    pub take_rate: f64,
}

/// One row of the Scale plan's tier table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleTier {
    pub tier: u8,
    /// Yearly fixed fee per location at this tier.
    pub fixed_fee: f64,
    /// Take rate in percent at this tier.
    pub take_rate: f64,
}

/// Launch side of a [`PlanComparison`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchQuote {
    /// `false` when the customer cannot buy Launch.  The figures are
    /// still populated so a disabled card can show them.
    pub available: bool,
    pub fixed_cost_yearly: f64,
    pub revenue_cost: f64,
    pub total_yearly: f64,
    pub effective_rate: f64,
}

/// Scale side of a [`PlanComparison`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleQuote {
    pub tier: u8,
    pub total_fixed_yearly: f64,
    pub revenue_cost: f64,
    pub total_yearly: f64,
    pub effective_rate: f64,
    pub tier_take_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Launch,
    Scale,
}

/// Both plans priced for the same customer, and which one to pick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanComparison {
    pub launch: LaunchQuote,
    pub scale: ScaleQuote,
    pub recommendation: Recommendation,
    /// Difference between the two yearly totals.  Always 0 when Launch
    /// is unavailable, since there is nothing to save against.
    pub savings_amount: f64,
    /// `savings_amount` as a percentage of the dearer plan.  Also 0
    /// when Launch is unavailable or both plans cost nothing.
    pub savings_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_rejects_negative_and_nan() {
        assert!(RevenueFigures::new(1.0, 0.0, 5.0).validate().is_ok());
        assert!(RevenueFigures::new(-1.0, 0.0, 0.0).validate().is_err());
        assert!(RevenueFigures::new(0.0, f64::NAN, 0.0).validate().is_err());
        assert!(RevenueFigures::new(0.0, 0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_request_defaults_when_fields_missing() {
        let request: PricingRequest =
            serde_json::from_value(json!({"revenues": {"garage": 1000.0}})).unwrap();
        assert_eq!(request.revenues, RevenueFigures::new(1000.0, 0.0, 0.0));
        assert!(request.options.include_mobile);
        assert_eq!(request.options.contract_type, ContractType::None);
    }

    #[test]
    fn test_options_use_camel_case() {
        let options: PricingOptions =
            serde_json::from_value(json!({"includeMobile": false, "contractType": "yearly"}))
                .unwrap();
        assert!(!options.include_mobile);
        assert_eq!(options.contract_type, ContractType::Yearly);
    }
}
