//! Client-side price estimation for print jobs.
//!
//! Only the service, copies, color mode and paper type take part in the
//! formula. Paper size and orientation are priced the same; changing them
//! must not move the estimate until the shop publishes a policy for them.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Amount, Service};

use super::options::{ColorMode, PaperType, PrintOptions};

pub const COLOR_SURCHARGE_PER_COPY: Amount = 200;
pub const GLOSSY_SURCHARGE_PER_COPY: Amount = 300;
pub const MATTE_SURCHARGE_PER_COPY: Amount = 500;

/// Largest base or per-page price a service may carry (10,000,000.00).
pub const MAX_UNIT_PRICE: Amount = 1_000_000_000;

/// Estimated total for `options` printed with `service`.
///
/// Returns 0 while no service is selected, which also covers a catalog that
/// has not loaded yet.
pub fn estimate(service: Option<&Service>, options: &PrintOptions) -> Amount {
    breakdown(service, options).total()
}

/// Itemised form of [`estimate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceBreakdown {
    pub base: Amount,
    pub per_page: Amount,
    pub color_surcharge: Amount,
    pub paper_surcharge: Amount,
}

impl PriceBreakdown {
    pub fn total(&self) -> Amount {
        self.base
            .saturating_add(self.per_page)
            .saturating_add(self.color_surcharge)
            .saturating_add(self.paper_surcharge)
    }
}

pub fn breakdown(service: Option<&Service>, options: &PrintOptions) -> PriceBreakdown {
    let Some(service) = service else {
        return PriceBreakdown::default();
    };
    let copies = Amount::from(options.copies.get());

    let per_page = if service.price_per_page > 0 {
        service.price_per_page.saturating_mul(copies)
    } else {
        0
    };

    let color_surcharge = match options.color_mode {
        ColorMode::Color => COLOR_SURCHARGE_PER_COPY * copies,
        ColorMode::Bw => 0,
    };

    let paper_surcharge = match options.paper_type {
        PaperType::Bond => 0,
        PaperType::Glossy => GLOSSY_SURCHARGE_PER_COPY * copies,
        PaperType::Matte => MATTE_SURCHARGE_PER_COPY * copies,
    };

    PriceBreakdown {
        base: service.base_price.max(0),
        per_page,
        color_surcharge,
        paper_surcharge,
    }
}
