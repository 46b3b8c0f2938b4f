//! Shock event engine
//!
//! Each week the engine makes one fire check against a fixed probability. On
//! a hit it picks exactly one catalog entry, weighted by the entry's affinity
//! for the current regime. A week therefore carries zero or one shock, never
//! more.
//!
//! A fired shock:
//! - compounds its per-sector effect onto that week's returns only:
//!   `r' = clamp((1 + r) * (1 + e) - 1)`
//! - optionally leaves a [`RegimeBias`] that is blended into the following
//!   week's regime transition and then discarded

use crate::market::regime::RegimeBias;
use crate::market::returns::clamp_return;
use crate::market::MatrixError;
use crate::models::market::{MacroState, Regime, Sector, SectorReturns};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Default weekly probability that a shock fires
pub const DEFAULT_SHOCK_PROBABILITY: f64 = 0.35;

/// Closed set of shock kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockKind {
    OilPriceSpike,
    TechEarningsMiss,
    BankingCrisisFears,
    ConsumerConfidencePlunge,
    SupplyChainDisruption,
    RegulatoryCrackdown,
    GeopoliticalTensions,
    InflationSurprise,
    CurrencyCrisis,
    CyberAttack,
    TechBreakthrough,
    StimulusPackage,
    EnergyDiscovery,
    RateCutRally,
    MergerWave,
    ConsumerSpendingBoom,
    SectorRotation,
    GreenEnergyPush,
    FlashCrash,
    TradeDealBreakthrough,
}

/// Static definition of one catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct ShockTemplate {
    pub kind: ShockKind,
    pub name: &'static str,
    pub narrative: &'static str,
    /// Per-sector gross-return effect in `Sector::ALL` order; 0.0 = unaffected
    pub effects: [f64; Sector::COUNT],
    /// Selection weight per regime in `Regime::ALL` order
    pub regime_weights: [f64; Regime::COUNT],
    pub regime_bias: Option<RegimeBias>,
}

impl ShockTemplate {
    /// Instantiate for a given week
    pub fn instantiate(&self, week: usize) -> ShockEvent {
        ShockEvent {
            kind: self.kind,
            week,
            name: self.name.to_string(),
            narrative: self.narrative.to_string(),
            effects: self.effects,
            regime_bias: self.regime_bias,
        }
    }
}

/// A shock that fired in a specific week
///
/// Self-contained so that it can be persisted and displayed without the
/// catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockEvent {
    pub kind: ShockKind,
    pub week: usize,
    pub name: String,
    pub narrative: String,
    pub effects: [f64; Sector::COUNT],
    pub regime_bias: Option<RegimeBias>,
}

impl ShockEvent {
    /// Sectors with a non-zero effect
    pub fn affected_sectors(&self) -> Vec<Sector> {
        Sector::ALL
            .into_iter()
            .filter(|s| self.effects[s.index()] != 0.0)
            .collect()
    }

    pub fn effect(&self, sector: Sector) -> f64 {
        self.effects[sector.index()]
    }

    /// Compound the shock onto base returns; unaffected sectors pass through
    pub fn apply(&self, base: &SectorReturns) -> SectorReturns {
        let mut adjusted = *base;
        for sector in self.affected_sectors() {
            let r = base.get(sector);
            let e = self.effect(sector);
            adjusted.set(sector, clamp_return((1.0 + r) * (1.0 + e) - 1.0));
        }
        adjusted
    }
}

const fn bias(toward: Regime, strength: f64) -> Option<RegimeBias> {
    Some(RegimeBias::new(toward, strength))
}

// Effects: Tech, Energy, Financials, Consumer, Industrials
// Weights: Bull, Bear, Recession, Recovery
const STANDARD_CATALOG: [ShockTemplate; 20] = [
    // --- negative ---
    ShockTemplate {
        kind: ShockKind::OilPriceSpike,
        name: "Oil Price Spike",
        narrative: "OPEC announces surprise production cuts. Crude oil surges 12% overnight.",
        effects: [-0.02, 0.06, -0.01, -0.03, -0.04],
        regime_weights: [0.3, 0.8, 0.5, 0.4],
        regime_bias: bias(Regime::Bear, 0.15),
    },
    ShockTemplate {
        kind: ShockKind::TechEarningsMiss,
        name: "Tech Earnings Miss",
        narrative: "Major tech giants report disappointing quarterly earnings. Analysts slash forecasts.",
        effects: [-0.08, 0.0, -0.02, -0.01, -0.01],
        regime_weights: [0.4, 0.7, 0.9, 0.3],
        regime_bias: bias(Regime::Bear, 0.10),
    },
    ShockTemplate {
        kind: ShockKind::BankingCrisisFears,
        name: "Banking Crisis Fears",
        narrative: "A regional bank announces massive loan losses. Contagion fears spread across the sector.",
        effects: [-0.03, -0.02, -0.10, -0.03, -0.02],
        regime_weights: [0.2, 0.6, 1.0, 0.2],
        regime_bias: bias(Regime::Recession, 0.25),
    },
    ShockTemplate {
        kind: ShockKind::ConsumerConfidencePlunge,
        name: "Consumer Confidence Plunge",
        narrative: "Consumer confidence index drops to decade lows. Retail stocks tumble.",
        effects: [-0.02, -0.01, -0.02, -0.07, -0.02],
        regime_weights: [0.2, 0.7, 0.8, 0.3],
        regime_bias: bias(Regime::Recession, 0.15),
    },
    ShockTemplate {
        kind: ShockKind::SupplyChainDisruption,
        name: "Supply Chain Disruption",
        narrative: "Major port congestion and shipping delays cripple global supply chains.",
        effects: [-0.03, 0.02, -0.01, -0.04, -0.06],
        regime_weights: [0.3, 0.5, 0.7, 0.4],
        regime_bias: bias(Regime::Bear, 0.10),
    },
    ShockTemplate {
        kind: ShockKind::RegulatoryCrackdown,
        name: "Regulatory Crackdown",
        narrative: "Government announces sweeping new regulations targeting Big Tech antitrust violations.",
        effects: [-0.06, 0.0, -0.02, 0.01, 0.0],
        regime_weights: [0.5, 0.4, 0.3, 0.6],
        regime_bias: None,
    },
    ShockTemplate {
        kind: ShockKind::GeopoliticalTensions,
        name: "Geopolitical Tensions",
        narrative: "Military conflict escalates in a key shipping corridor. Markets reel on uncertainty.",
        effects: [-0.03, 0.04, -0.03, -0.03, -0.05],
        regime_weights: [0.3, 0.6, 0.7, 0.3],
        regime_bias: bias(Regime::Bear, 0.15),
    },
    ShockTemplate {
        kind: ShockKind::InflationSurprise,
        name: "Inflation Surprise",
        narrative: "CPI comes in far above expectations. The Fed signals emergency rate action.",
        effects: [-0.05, 0.03, -0.04, -0.03, -0.02],
        regime_weights: [0.4, 0.7, 0.3, 0.5],
        regime_bias: bias(Regime::Bear, 0.10),
    },
    ShockTemplate {
        kind: ShockKind::CurrencyCrisis,
        name: "Currency Crisis",
        narrative: "The dollar plunges against major currencies. Imported goods costs soar.",
        effects: [-0.02, 0.03, -0.04, -0.05, -0.03],
        regime_weights: [0.2, 0.5, 0.8, 0.2],
        regime_bias: bias(Regime::Recession, 0.20),
    },
    ShockTemplate {
        kind: ShockKind::CyberAttack,
        name: "Cyber Attack",
        narrative: "A massive cyberattack takes down critical financial infrastructure for 48 hours.",
        effects: [-0.05, -0.01, -0.06, -0.02, -0.01],
        regime_weights: [0.3, 0.4, 0.5, 0.3],
        regime_bias: None,
    },
    // --- positive ---
    ShockTemplate {
        kind: ShockKind::TechBreakthrough,
        name: "Tech Breakthrough",
        narrative: "A revolutionary AI advancement sends tech stocks soaring. Investors pile in.",
        effects: [0.08, 0.0, 0.02, 0.01, 0.02],
        regime_weights: [0.7, 0.2, 0.1, 0.6],
        regime_bias: bias(Regime::Bull, 0.10),
    },
    ShockTemplate {
        kind: ShockKind::StimulusPackage,
        name: "Stimulus Package",
        narrative: "Congress passes a massive infrastructure and stimulus bill. Markets rally broadly.",
        effects: [0.02, 0.03, 0.03, 0.04, 0.06],
        regime_weights: [0.3, 0.4, 0.8, 0.7],
        regime_bias: bias(Regime::Recovery, 0.25),
    },
    ShockTemplate {
        kind: ShockKind::EnergyDiscovery,
        name: "Energy Discovery",
        narrative: "A massive new natural gas field is discovered. Energy stocks surge on growth prospects.",
        effects: [0.0, 0.09, 0.01, 0.01, 0.03],
        regime_weights: [0.5, 0.3, 0.2, 0.5],
        regime_bias: None,
    },
    ShockTemplate {
        kind: ShockKind::RateCutRally,
        name: "Rate Cut Rally",
        narrative: "The Fed surprises markets with an aggressive rate cut. Borrowers rejoice.",
        effects: [0.05, 0.01, -0.02, 0.04, 0.03],
        regime_weights: [0.2, 0.5, 0.7, 0.6],
        regime_bias: bias(Regime::Recovery, 0.20),
    },
    ShockTemplate {
        kind: ShockKind::MergerWave,
        name: "Merger Wave",
        narrative: "A wave of mega-mergers sweeps the financial sector. M&A activity hits record highs.",
        effects: [0.02, 0.01, 0.06, 0.01, 0.02],
        regime_weights: [0.7, 0.2, 0.1, 0.5],
        regime_bias: bias(Regime::Bull, 0.10),
    },
    ShockTemplate {
        kind: ShockKind::ConsumerSpendingBoom,
        name: "Consumer Spending Boom",
        narrative: "Holiday sales shatter records. Consumer stocks lead the market higher.",
        effects: [0.02, 0.01, 0.02, 0.07, 0.01],
        regime_weights: [0.6, 0.1, 0.1, 0.5],
        regime_bias: bias(Regime::Bull, 0.15),
    },
    // --- rotation / mixed ---
    ShockTemplate {
        kind: ShockKind::SectorRotation,
        name: "Sector Rotation",
        narrative: "Institutional investors rotate out of growth into value. A classic risk-off move.",
        effects: [-0.04, 0.03, 0.02, 0.01, 0.03],
        regime_weights: [0.4, 0.5, 0.3, 0.4],
        regime_bias: None,
    },
    ShockTemplate {
        kind: ShockKind::GreenEnergyPush,
        name: "Green Energy Push",
        narrative: "New climate legislation accelerates renewable investment. Traditional energy faces headwinds.",
        effects: [0.03, -0.05, 0.0, 0.01, 0.04],
        regime_weights: [0.5, 0.3, 0.3, 0.6],
        regime_bias: None,
    },
    ShockTemplate {
        kind: ShockKind::FlashCrash,
        name: "Flash Crash",
        narrative: "An algorithmic trading malfunction triggers a brief but violent market sell-off.",
        effects: [-0.04, -0.03, -0.05, -0.02, -0.03],
        regime_weights: [0.3, 0.5, 0.4, 0.3],
        regime_bias: bias(Regime::Bear, 0.10),
    },
    ShockTemplate {
        kind: ShockKind::TradeDealBreakthrough,
        name: "Trade Deal Breakthrough",
        narrative: "A landmark international trade agreement removes tariffs. Exporters celebrate.",
        effects: [0.03, 0.02, 0.02, 0.03, 0.05],
        regime_weights: [0.5, 0.3, 0.3, 0.7],
        regime_bias: bias(Regime::Bull, 0.15),
    },
];

/// Fixed list of shock templates
#[derive(Debug, Clone, PartialEq)]
pub struct ShockCatalog {
    templates: Vec<ShockTemplate>,
}

impl Default for ShockCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ShockCatalog {
    /// The twenty built-in shocks
    pub fn standard() -> Self {
        Self::new(STANDARD_CATALOG.to_vec())
    }

    pub fn new(templates: Vec<ShockTemplate>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[ShockTemplate] {
        &self.templates
    }

    pub fn get(&self, kind: ShockKind) -> Option<&ShockTemplate> {
        self.templates.iter().find(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Schema check run once at startup
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.templates.is_empty() {
            return Err(MatrixError::InvalidCatalog("catalog is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for template in &self.templates {
            if !seen.insert(template.kind) {
                return Err(MatrixError::InvalidCatalog(format!(
                    "duplicate entry {:?}",
                    template.kind
                )));
            }
            if template.effects.iter().all(|e| *e == 0.0) {
                return Err(MatrixError::InvalidCatalog(format!(
                    "{} affects no sector",
                    template.name
                )));
            }
            if template.effects.iter().any(|e| !e.is_finite() || *e <= -1.0) {
                return Err(MatrixError::InvalidCatalog(format!(
                    "{} has an effect outside (-100%, +inf)",
                    template.name
                )));
            }
            if template.regime_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(MatrixError::InvalidCatalog(format!(
                    "{} has a negative regime weight",
                    template.name
                )));
            }
            if let Some(bias) = &template.regime_bias {
                bias.validate()?;
            }
        }

        for regime in Regime::ALL {
            let total: f64 = self
                .templates
                .iter()
                .map(|t| t.regime_weights[regime.index()])
                .sum();
            if total <= 0.0 {
                return Err(MatrixError::InvalidCatalog(format!(
                    "no shock can be selected in regime {:?}",
                    regime
                )));
            }
        }

        Ok(())
    }
}

/// Weekly shock injector
#[derive(Debug, Clone)]
pub struct ShockEngine {
    catalog: ShockCatalog,
    probability: f64,
}

impl Default for ShockEngine {
    fn default() -> Self {
        Self::new(ShockCatalog::standard(), DEFAULT_SHOCK_PROBABILITY)
    }
}

impl ShockEngine {
    pub fn new(catalog: ShockCatalog, probability: f64) -> Self {
        Self {
            catalog,
            probability,
        }
    }

    pub fn catalog(&self) -> &ShockCatalog {
        &self.catalog
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn validate(&self) -> Result<(), MatrixError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(MatrixError::InvalidParameter {
                table: "shock_engine",
                name: "probability".to_string(),
                value: self.probability,
            });
        }
        self.catalog.validate()
    }

    /// Zero or one shock for `week`
    ///
    /// Consumes one draw for the fire check, and one more only when the
    /// shock fires.
    pub fn maybe_trigger(
        &self,
        week: usize,
        state: &MacroState,
        rng: &mut RngManager,
    ) -> Option<ShockEvent> {
        if !rng.chance(self.probability) {
            return None;
        }

        let weights: Vec<f64> = self
            .catalog
            .templates
            .iter()
            .map(|t| t.regime_weights[state.regime.index()])
            .collect();
        let template = &self.catalog.templates[rng.choose_weighted(&weights)];

        debug!(week, shock = template.name, "shock fired");
        Some(template.instantiate(week))
    }
}
