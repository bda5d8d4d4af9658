//! Pricing computation engine.
//!
//! The `engine` module turns [`RevenueFigures`] into a
//! [`PricingResult`].  A single tier is detected from the customer's
//! total revenue and every service is then charged its flat rate for
//! that tier on its *entire* revenue; this is not a marginal bracket
//! system.  Batches of requests are priced in parallel with [`rayon`].

use crate::models::{
    PricingOptions, PricingRequest, PricingResult, RevenueFigures, Service, ServiceBreakdown,
};
use crate::rates::PricingConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Stateless calculator over an immutable [`PricingConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PricingEngine {
    config: PricingConfig,
}

/// One line of the published tier table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRow {
    pub tier: u8,
    pub lower_bound: f64,
    /// `None` for the terminal tier.
    pub upper_bound: Option<f64>,
    pub garage_rate: f64,
    pub shop_rate: f64,
    pub mobile_rate: f64,
}

/// Percentage of `cost` over `revenue`, or 0 when there is no revenue.
pub(crate) fn effective_rate(cost: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        cost / revenue * 100.0
    } else {
        0.0
    }
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Prices one customer.
    ///
    /// Revenues must be non-negative finite numbers; other values give
    /// meaningless (but finite or NaN) figures rather than an error.
    pub fn calculate_pricing(
        &self,
        revenues: &RevenueFigures,
        options: &PricingOptions,
    ) -> PricingResult {
        let active = |service: Service| service != Service::Mobile || options.include_mobile;
        let total_revenue: f64 = Service::ALL
            .iter()
            .filter(|s| active(**s))
            .map(|s| revenues.get(*s))
            .sum();
        let tier = self.config.tiers.detect_tier(total_revenue);

        let mut usage = ServiceBreakdown::default();
        let mut costs = ServiceBreakdown::default();
        for service in Service::ALL.into_iter().filter(|s| active(*s)) {
            let rate = self.config.services.get(service).rate_for_tier(tier);
            let usage_cost = revenues.get(service) * rate;
            usage.set(service, usage_cost);
            costs.set(
                service,
                self.config
                    .discounts
                    .apply_discount(usage_cost, options.contract_type),
            );
        }

        let total_before_discount = usage.sum();
        let total = costs.sum();
        PricingResult {
            usage,
            total,
            effective_rate: effective_rate(total, total_revenue),
            discount: total_before_discount - total,
            garage_cost: costs.garage,
            shop_cost: costs.shop,
            mobile_cost: costs.mobile,
            tier,
            total_revenue,
        }
    }

    /// Prices every request in parallel.  Results keep the input order.
    pub fn calculate_batch(&self, requests: Vec<PricingRequest>) -> Vec<PricingResult> {
        requests
            .into_par_iter()
            .map(|request| self.calculate_pricing(&request.revenues, &request.options))
            .collect()
    }

    /// Boundaries and per-service rates for every tier.
    pub fn tier_table(&self) -> Vec<TierRow> {
        let boundaries = self.config.tiers.boundaries();
        let services = &self.config.services;
        (1..=self.config.tiers.tier_count)
            .map(|tier| {
                let index = usize::from(tier - 1);
                let lower_bound = if index == 0 { 0.0 } else { boundaries[index - 1] };
                TierRow {
                    tier,
                    lower_bound,
                    upper_bound: boundaries.get(index).copied(),
                    garage_rate: services.garage.rate_for_tier(tier),
                    shop_rate: services.shop.rate_for_tier(tier),
                    mobile_rate: services.mobile.rate_for_tier(tier),
                }
            })
            .collect()
    }
}

/// [`PricingEngine::calculate_pricing`] with the default rate tables.
pub fn calculate_pricing(revenues: &RevenueFigures, options: &PricingOptions) -> PricingResult {
    PricingEngine::default().calculate_pricing(revenues, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContractType;
    use crate::rates::{ServiceRate, TierSchedule};

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn with_contract(contract_type: ContractType) -> PricingOptions {
        PricingOptions {
            contract_type,
            ..PricingOptions::default()
        }
    }

    #[test]
    fn test_single_service_in_tier_one() {
        let result = calculate_pricing(
            &RevenueFigures::new(50_000.0, 0.0, 0.0),
            &PricingOptions::default(),
        );
        assert_eq!(result.tier, 1);
        assert_close(result.garage_cost, 2_000.0);
        assert_close(result.total, 2_000.0);
        assert_close(result.effective_rate, 4.0);
        assert_eq!(result.discount, 0.0);
    }

    #[test]
    fn test_exact_boundary_uses_next_tier_rate() {
        let result = calculate_pricing(
            &RevenueFigures::new(100_000.0, 0.0, 0.0),
            &PricingOptions::default(),
        );
        assert_eq!(result.tier, 2);
        assert_close(result.garage_cost, 100_000.0 * 0.034);
        assert_close(result.effective_rate, 3.4);
    }

    #[test]
    fn test_zero_revenue_has_zero_effective_rate() {
        let result = calculate_pricing(&RevenueFigures::default(), &PricingOptions::default());
        assert_eq!(result.effective_rate, 0.0);
        assert_eq!(result.total, 0.0);
        assert_eq!(result.tier, 1);
    }

    #[test]
    fn test_all_services_share_one_flat_tier() {
        let revenues = RevenueFigures::new(200_000.0, 100_000.0, 50_000.0);
        let result = calculate_pricing(&revenues, &PricingOptions::default());
        // 350k total sits exactly on the tier-3 boundary.
        assert_eq!(result.tier, 3);
        let factor = 0.85f64.powi(2);
        assert_close(result.garage_cost, 200_000.0 * 0.04 * factor);
        assert_close(result.shop_cost, 100_000.0 * 0.05 * factor);
        assert_close(result.mobile_cost, 50_000.0 * 0.10 * factor);
        assert_close(
            result.total,
            result.garage_cost + result.shop_cost + result.mobile_cost,
        );
    }

    #[test]
    fn test_excluding_mobile_drops_it_from_tier_and_cost() {
        let revenues = RevenueFigures::new(60_000.0, 0.0, 60_000.0);
        let included = calculate_pricing(&revenues, &PricingOptions::default());
        let excluded = calculate_pricing(
            &revenues,
            &PricingOptions {
                include_mobile: false,
                ..PricingOptions::default()
            },
        );
        assert_eq!(included.tier, 2);
        assert_eq!(excluded.tier, 1);
        assert_eq!(excluded.mobile_cost, 0.0);
        assert_eq!(excluded.usage.mobile, 0.0);
        assert_close(excluded.total_revenue, 60_000.0);
        assert_close(excluded.total, 2_400.0);
    }

    #[test]
    fn test_yearly_contract_is_eighty_percent_of_none() {
        let revenues = RevenueFigures::new(400_000.0, 250_000.0, 80_000.0);
        let none = calculate_pricing(&revenues, &with_contract(ContractType::None));
        let yearly = calculate_pricing(&revenues, &with_contract(ContractType::Yearly));
        assert_close(yearly.total, none.total * 0.80);
        assert_close(yearly.discount, none.total * 0.20);
        assert_eq!(yearly.usage, none.usage);
    }

    #[test]
    fn test_monthly_discount_amount() {
        let result = calculate_pricing(
            &RevenueFigures::new(100_000.0, 0.0, 0.0),
            &with_contract(ContractType::Monthly),
        );
        let before = 100_000.0 * 0.034;
        assert_close(result.usage.garage, before);
        assert_close(result.discount, before * 0.10);
        assert_close(result.total, before * 0.90);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let revenues = RevenueFigures::new(123_456.78, 98_765.43, 4_321.0);
        let options = with_contract(ContractType::Monthly);
        let first = calculate_pricing(&revenues, &options);
        let second = calculate_pricing(&revenues, &options);
        assert_eq!(first.total.to_bits(), second.total.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_preserves_order() {
        let engine = PricingEngine::default();
        let requests: Vec<PricingRequest> = (0..64)
            .map(|i| PricingRequest {
                revenues: RevenueFigures::new(f64::from(i) * 25_000.0, 10_000.0, 0.0),
                options: PricingOptions::default(),
            })
            .collect();
        let results = engine.calculate_batch(requests.clone());
        assert_eq!(results.len(), requests.len());
        for (request, result) in requests.iter().zip(&results) {
            assert_eq!(
                *result,
                engine.calculate_pricing(&request.revenues, &request.options)
            );
        }
    }

    #[test]
    fn test_custom_rate_table() {
        let mut config = PricingConfig::default();
        config.services.garage = ServiceRate::new(0.02);
        let engine = PricingEngine::new(config);
        let result = engine.calculate_pricing(
            &RevenueFigures::new(50_000.0, 0.0, 0.0),
            &PricingOptions::default(),
        );
        assert_close(result.garage_cost, 1_000.0);
    }

    #[test]
    fn test_tier_table_is_contiguous() {
        let table = PricingEngine::default().tier_table();
        assert_eq!(table.len(), 10);
        assert_eq!(table[0].lower_bound, 0.0);
        assert_eq!(table[0].upper_bound, Some(100_000.0));
        for pair in table.windows(2) {
            assert_eq!(pair[0].upper_bound, Some(pair[1].lower_bound));
            assert!(pair[1].garage_rate < pair[0].garage_rate);
        }
        assert_eq!(table[9].upper_bound, None);
        assert_close(table[0].mobile_rate, 0.10);
    }

    #[test]
    fn test_tier_table_follows_schedule() {
        let config = PricingConfig {
            tiers: TierSchedule {
                tier_count: 3,
                ..TierSchedule::default()
            },
            ..PricingConfig::default()
        };
        let table = PricingEngine::new(config).tier_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table[2].lower_bound, 350_000.0);
        assert_eq!(table[2].upper_bound, None);
    }
}
