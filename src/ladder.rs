//! Price ladder computation.
//!
//! The ladder is a grid of candidate option prices from $0.00 to $10.00 in
//! one-cent steps. Each grid row is paired with a trigger level on the
//! underlying: the middle row (index 500) maps to the underlying itself and
//! every row away from it shifts the trigger by one cent.
//!
//! All arithmetic is done on integer grid indices and converted to
//! [`Decimal`] once, so no drift accumulates across the grid.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

/// Highest grid index (option price $10.00).
pub const GRID_MAX_INDEX: i32 = 1000;

/// Grid index whose trigger equals the underlying.
pub const MID_INDEX: i32 = 500;

/// Largest selectable distance from the middle row, in either direction.
pub const MAX_OFFSET: i32 = 250;

/// Rows shown on each side of the selected row by default.
pub const DEFAULT_WINDOW_RADIUS: u32 = 15;

/// Upper bound for underlying prices and TP/SL distances.
pub const MAX_PRICE: Decimal = dec!(1000000);

/// A usable underlying price: positive and at most [`MAX_PRICE`].
#[must_use]
pub fn is_valid_price(value: Decimal) -> bool {
    value > Decimal::ZERO && value <= MAX_PRICE
}

/// A usable TP/SL distance: within `[0, MAX_PRICE]`.
#[must_use]
pub fn is_valid_distance(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= MAX_PRICE
}

/// Ladder inputs besides the underlying price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderParams {
    /// Selected row, relative to the middle row.
    pub selected_offset: i32,
    /// Rows on each side of the selected row.
    pub window_radius: u32,
    /// Take-profit distance in dollars.
    pub take_profit: Decimal,
    /// Stop-loss distance in dollars.
    pub stop_loss: Decimal,
}

impl Default for LadderParams {
    fn default() -> Self {
        Self {
            selected_offset: 0,
            window_radius: DEFAULT_WINDOW_RADIUS,
            take_profit: dec!(0.05),
            stop_loss: dec!(0.03),
        }
    }
}

/// One ladder row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LadderEntry {
    /// Position on the 0..=1000 grid.
    pub grid_index: i32,
    /// Option price for this row.
    pub option_price: Decimal,
    /// Underlying trigger level, rounded to cents.
    pub trigger_price: Decimal,
    /// The row's trigger equals the underlying.
    pub is_mid_market: bool,
    /// The currently selected row.
    pub is_selected: bool,
}

/// Entry, take-profit and stop-loss levels for the selected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TradeLevels {
    /// Selected row, relative to the middle row (after clamping).
    pub offset: i32,
    /// Option limit price of the selected row.
    pub option_price: Decimal,
    /// Underlying level that triggers entry.
    pub entry_trigger: Decimal,
    /// Take-profit level.
    pub take_profit: Decimal,
    /// Stop-loss level.
    pub stop_loss: Decimal,
}

/// A computed ladder window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ladder {
    /// Underlying price the ladder was computed from.
    pub underlying: Decimal,
    /// Rows in ascending grid order.
    pub entries: Vec<LadderEntry>,
    /// Levels for the selected row.
    pub levels: TradeLevels,
}

/// Result of a ladder computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LadderWindow {
    /// No underlying price has been received yet.
    NoPrice,
    /// Ladder computed from the latest price.
    Ready(Ladder),
}

/// Rounds a price to cents, halves away from zero.
#[must_use]
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a whole number of cents to dollars.
fn cents(count: i32) -> Decimal {
    Decimal::new(i64::from(count), 2)
}

/// Clamps a selection offset to `[-MAX_OFFSET, MAX_OFFSET]`.
#[must_use]
pub fn clamp_offset(offset: i32) -> i32 {
    offset.clamp(-MAX_OFFSET, MAX_OFFSET)
}

/// Moves the selection one row up, saturating at the band edge.
#[must_use]
pub fn step_up(offset: i32) -> i32 {
    clamp_offset(offset.saturating_add(1))
}

/// Moves the selection one row down, saturating at the band edge.
#[must_use]
pub fn step_down(offset: i32) -> i32 {
    clamp_offset(offset.saturating_sub(1))
}

/// Offset of the middle row.
#[must_use]
pub fn center() -> i32 {
    0
}

/// Offset that selects the given grid row.
#[must_use]
pub fn offset_for_grid_index(grid_index: i32) -> i32 {
    clamp_offset(grid_index.saturating_sub(MID_INDEX))
}

/// Option price of a grid row.
#[must_use]
pub fn option_price(grid_index: i32) -> Decimal {
    cents(grid_index.clamp(0, GRID_MAX_INDEX))
}

/// Entry, take-profit and stop-loss levels for a selection.
///
/// TP and SL distances are applied as given; nothing checks that
/// `stop_loss < entry < take_profit`.
#[must_use]
pub fn trade_levels(
    underlying: Decimal,
    selected_offset: i32,
    take_profit: Decimal,
    stop_loss: Decimal,
) -> TradeLevels {
    let offset = clamp_offset(selected_offset);
    let entry = underlying + cents(offset);

    TradeLevels {
        offset,
        option_price: option_price(MID_INDEX + offset),
        entry_trigger: round_price(entry),
        take_profit: round_price(entry + take_profit),
        stop_loss: round_price(entry - stop_loss),
    }
}

/// Computes the ladder window around the selected row.
///
/// Returns [`LadderWindow::NoPrice`] when no underlying price is known. The
/// selection offset is clamped silently. Rows cover
/// `[selected - radius, selected + radius]` cut to the grid.
#[must_use]
pub fn compute_ladder(underlying: Option<Decimal>, params: &LadderParams) -> LadderWindow {
    let Some(underlying) = underlying else {
        return LadderWindow::NoPrice;
    };

    let levels = trade_levels(
        underlying,
        params.selected_offset,
        params.take_profit,
        params.stop_loss,
    );
    let selected = MID_INDEX + levels.offset;
    let radius = i32::try_from(params.window_radius)
        .unwrap_or(GRID_MAX_INDEX)
        .min(GRID_MAX_INDEX);
    let start = (selected - radius).max(0);
    let end = (selected + radius).min(GRID_MAX_INDEX);

    let entries = (start..=end)
        .map(|grid_index| {
            let trigger_price = round_price(underlying + cents(grid_index - MID_INDEX));
            // A sub-cent underlying has no row whose displayed trigger equals it.
            let is_mid_market = trigger_price == underlying;

            LadderEntry {
                grid_index,
                option_price: option_price(grid_index),
                trigger_price,
                is_mid_market,
                is_selected: grid_index == selected,
            }
        })
        .collect();

    LadderWindow::Ready(Ladder {
        underlying,
        entries,
        levels,
    })
}
