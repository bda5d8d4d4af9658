//! Tier schedule, rate decay and discount tables.
//!
//! The `rates` module holds the fixed commercial constants of the
//! pricing model and wraps them in immutable configuration structs.
//! The structs' `Default` impls reproduce the constants exactly; a
//! [`PricingConfig`] may also be loaded from JSON so an alternate rate
//! table can be tried without touching code.

use crate::error::PricingError;
use crate::models::{ContractType, Service};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width of tier 1, in EUR of annual revenue.
pub const INITIAL_TIER_SPAN: f64 = 100_000.0;
/// Each tier is this many times wider than the one before it.
pub const TIER_SPAN_GROWTH: f64 = 2.5;
pub const TIER_COUNT: u8 = 10;

pub const GARAGE_BASE_RATE: f64 = 0.04;
pub const SHOP_BASE_RATE: f64 = 0.05;
pub const MOBILE_BASE_RATE: f64 = 0.10;

/// Rate reduction per tier step up to [`PHASE_ONE_LAST_TIER`].
pub const PHASE_ONE_COOLDOWN: f64 = 0.15;
/// Rate reduction per tier step above [`PHASE_ONE_LAST_TIER`].
pub const PHASE_TWO_COOLDOWN: f64 = 0.10;
pub const PHASE_ONE_LAST_TIER: u8 = 5;

pub const MONTHLY_DISCOUNT: f64 = 0.10;
pub const YEARLY_DISCOUNT: f64 = 0.20;

/// Geometrically growing revenue boundaries between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TierSchedule {
    pub initial_span: f64,
    pub growth: f64,
    pub tier_count: u8,
}

impl Default for TierSchedule {
    fn default() -> Self {
        Self {
            initial_span: INITIAL_TIER_SPAN,
            growth: TIER_SPAN_GROWTH,
            tier_count: TIER_COUNT,
        }
    }
}

impl TierSchedule {
    /// Maps total annual revenue to a tier in `1..=tier_count`.
    ///
    /// Revenue equal to a boundary belongs to the tier above it.  The
    /// last tier has no upper bound.
    pub fn detect_tier(&self, total_revenue: f64) -> u8 {
        let mut boundary = 0.0;
        let mut span = self.initial_span;
        for tier in 1..self.tier_count {
            boundary += span;
            if total_revenue < boundary {
                return tier;
            }
            span *= self.growth;
        }
        self.tier_count.max(1)
    }

    /// Upper boundaries of every tier except the last, in tier order.
    pub fn boundaries(&self) -> Vec<f64> {
        let mut boundaries = Vec::with_capacity(self.tier_count.saturating_sub(1) as usize);
        let mut boundary = 0.0;
        let mut span = self.initial_span;
        for _ in 1..self.tier_count {
            boundary += span;
            boundaries.push(boundary);
            span *= self.growth;
        }
        boundaries
    }
}

/// Two-phase exponential decay of a rate across tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CooldownSchedule {
    pub phase_one: f64,
    pub phase_two: f64,
    pub phase_one_last_tier: u8,
}

impl Default for CooldownSchedule {
    fn default() -> Self {
        Self {
            phase_one: PHASE_ONE_COOLDOWN,
            phase_two: PHASE_TWO_COOLDOWN,
            phase_one_last_tier: PHASE_ONE_LAST_TIER,
        }
    }
}

impl CooldownSchedule {
    /// Rate charged at `tier` for a service whose tier-1 rate is
    /// `base_rate`.  Tier 0 is treated as tier 1.  No rounding is done
    /// here.
    pub fn rate_for_tier(&self, base_rate: f64, tier: u8) -> f64 {
        let tier = tier.max(1);
        let phase_one_factor = 1.0 - self.phase_one;
        if tier <= self.phase_one_last_tier {
            return base_rate * phase_one_factor.powi(i32::from(tier - 1));
        }
        // Continue from the last phase-one rate so the curve has no jump.
        let last_phase_one_rate =
            base_rate * phase_one_factor.powi(i32::from(self.phase_one_last_tier.saturating_sub(1)));
        last_phase_one_rate * (1.0 - self.phase_two).powi(i32::from(tier - self.phase_one_last_tier))
    }
}

/// [`CooldownSchedule::rate_for_tier`] with the default schedule.
pub fn rate_for_tier(base_rate: f64, tier: u8) -> f64 {
    CooldownSchedule::default().rate_for_tier(base_rate, tier)
}

/// [`TierSchedule::detect_tier`] with the default schedule.
pub fn detect_tier(total_revenue: f64) -> u8 {
    TierSchedule::default().detect_tier(total_revenue)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRate {
    pub base_rate: f64,
    #[serde(default)]
    pub cooldown: CooldownSchedule,
}

impl ServiceRate {
    pub fn new(base_rate: f64) -> Self {
        Self {
            base_rate,
            cooldown: CooldownSchedule::default(),
        }
    }

    pub fn rate_for_tier(&self, tier: u8) -> f64 {
        self.cooldown.rate_for_tier(self.base_rate, tier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRateTable {
    pub garage: ServiceRate,
    pub shop: ServiceRate,
    pub mobile: ServiceRate,
}

impl Default for ServiceRateTable {
    fn default() -> Self {
        Self {
            garage: ServiceRate::new(GARAGE_BASE_RATE),
            shop: ServiceRate::new(SHOP_BASE_RATE),
            mobile: ServiceRate::new(MOBILE_BASE_RATE),
        }
    }
}

impl ServiceRateTable {
    pub fn get(&self, service: Service) -> &ServiceRate {
        match service {
            Service::Garage => &self.garage,
            Service::Shop => &self.shop,
            Service::Mobile => &self.mobile,
        }
    }
}

/// Contract discount fractions.  Fractions must stay below 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountSchedule {
    pub monthly: f64,
    pub yearly: f64,
}

impl Default for DiscountSchedule {
    fn default() -> Self {
        Self {
            monthly: MONTHLY_DISCOUNT,
            yearly: YEARLY_DISCOUNT,
        }
    }
}

impl DiscountSchedule {
    pub fn discount_fraction(&self, contract_type: ContractType) -> f64 {
        match contract_type {
            ContractType::None => 0.0,
            ContractType::Monthly => self.monthly,
            ContractType::Yearly => self.yearly,
        }
    }

    pub fn apply_discount(&self, amount: f64, contract_type: ContractType) -> f64 {
        amount * (1.0 - self.discount_fraction(contract_type))
    }
}

/// [`DiscountSchedule::apply_discount`] with the default fractions.
pub fn apply_discount(amount: f64, contract_type: ContractType) -> f64 {
    DiscountSchedule::default().apply_discount(amount, contract_type)
}

/// Every table the engine needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub tiers: TierSchedule,
    pub services: ServiceRateTable,
    pub discounts: DiscountSchedule,
}

fn invalid(message: String) -> PricingError {
    PricingError::InvalidConfig(message)
}

/// `value` must lie in `0 < value < 1`.
fn check_fraction(name: &str, value: f64) -> Result<(), PricingError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be between 0 and 1 exclusive, got {}", name, value)))
    }
}

impl TierSchedule {
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.initial_span.is_finite() && self.initial_span > 0.0) {
            return Err(invalid(format!(
                "tiers.initialSpan must be positive, got {}",
                self.initial_span
            )));
        }
        if !(self.growth.is_finite() && self.growth > 1.0) {
            return Err(invalid(format!(
                "tiers.growth must be greater than 1, got {}",
                self.growth
            )));
        }
        if self.tier_count == 0 {
            return Err(invalid("tiers.tierCount must be at least 1".into()));
        }
        Ok(())
    }
}

impl CooldownSchedule {
    pub fn validate(&self, service: &str) -> Result<(), PricingError> {
        check_fraction(&format!("{}.cooldown.phaseOne", service), self.phase_one)?;
        check_fraction(&format!("{}.cooldown.phaseTwo", service), self.phase_two)?;
        if self.phase_one_last_tier == 0 {
            return Err(invalid(format!(
                "{}.cooldown.phaseOneLastTier must be at least 1",
                service
            )));
        }
        Ok(())
    }
}

impl ServiceRateTable {
    pub fn validate(&self) -> Result<(), PricingError> {
        for service in Service::ALL {
            let name = format!("services.{:?}", service).to_lowercase();
            let rate = self.get(service);
            if !(rate.base_rate.is_finite() && rate.base_rate >= 0.0) {
                return Err(invalid(format!(
                    "{}.baseRate must be non-negative, got {}",
                    name, rate.base_rate
                )));
            }
            rate.cooldown.validate(&name)?;
        }
        Ok(())
    }
}

impl DiscountSchedule {
    pub fn validate(&self) -> Result<(), PricingError> {
        for (name, value) in [("discounts.monthly", self.monthly), ("discounts.yearly", self.yearly)] {
            if !(0.0..1.0).contains(&value) {
                return Err(invalid(format!(
                    "{} must be at least 0 and below 1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl PricingConfig {
    /// Reads and validates a rate file.  Fields absent from the file
    /// keep their default values.
    pub fn load(path: &Path) -> Result<Self, PricingError> {
        let data = std::fs::read_to_string(path)?;
        let config: PricingConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects tables that would break tier ordering or rate decay.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.tiers.validate()?;
        self.services.validate()?;
        self.discounts.validate()
    }
}
