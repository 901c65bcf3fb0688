use rand::{Rng, RngCore};

use crate::tags::{GT, GTE, LT, LTE, ParsedTag, TagSet, WEIGHTS};

/// Upper bound (exclusive) for string and sequence lengths without `lt`/`lte`.
pub(crate) const DEFAULT_LENGTH_LIMIT: i128 = 127;

/// Largest string or sequence length a length tag may request.
pub const MAX_LENGTH: usize = 1 << 20;

/// Largest number of fractional digits honoured by decimal bounds.
const MAX_SCALE_DIGITS: u32 = 18;

/// Folds `gt`/`gte`/`lt`/`lte` into a half-open range `[lower, upper)`.
///
/// `gt` and `lte` are shifted by one increment. When several bounds apply to
/// one side the tighter one wins; a missing side takes the default. Returns
/// `None` when no bound is present or the range is empty.
pub(crate) fn half_open(
    tags: &TagSet,
    read: impl Fn(&ParsedTag) -> Option<i128>,
    default_lower: i128,
    default_upper: i128,
) -> Option<(i128, i128)> {
    let bound = |key: &str| tags.get(key).and_then(&read);
    let gt = bound(GT).map(|value| value.saturating_add(1));
    let gte = bound(GTE);
    let lt = bound(LT);
    let lte = bound(LTE).map(|value| value.saturating_add(1));
    if gt.is_none() && gte.is_none() && lt.is_none() && lte.is_none() {
        return None;
    }
    let lower = gt.into_iter().chain(gte).max().unwrap_or(default_lower);
    let upper = lt.into_iter().chain(lte).min().unwrap_or(default_upper);
    (lower < upper).then_some((lower, upper))
}

/// Uniform draw from `[lower, upper)`. A range straddling zero first picks
/// a side in proportion to its width, then draws within that side.
pub(crate) fn sample(rng: &mut dyn RngCore, lower: i128, upper: i128) -> i128 {
    if lower >= 0 || upper <= 0 {
        return rng.random_range(lower..upper);
    }
    let point = rng.random_range(0..upper - lower);
    if point < upper {
        sample(rng, 0, upper)
    } else {
        sample(rng, lower, 0)
    }
}

/// Scaling factor that turns decimal bounds into integers: ten to the
/// largest number of fractional digits written in any bound.
pub(crate) fn decimal_scale(tags: &TagSet) -> i128 {
    let digits = [GT, GTE, LT, LTE]
        .iter()
        .filter_map(|key| tags.get(key))
        .map(|tag| fractional_digits(tag.raw()))
        .max()
        .unwrap_or(0)
        .min(MAX_SCALE_DIGITS);
    10i128.pow(digits)
}

fn fractional_digits(raw: &str) -> u32 {
    raw.trim()
        .split_once('.')
        .map(|(_, fraction)| fraction.chars().take_while(char::is_ascii_digit).count() as u32)
        .unwrap_or(0)
}

/// Picks one of `options`, weighted by the `weights` tag when present.
/// Missing weights count as 1 and extra weights are ignored.
pub(crate) fn pick<'a, T>(options: &'a [T], tags: &TagSet, rng: &mut dyn RngCore) -> Option<&'a T> {
    let weights = tags.get(WEIGHTS).and_then(ParsedTag::int_list).unwrap_or(&[]);
    let weight = |index: usize| weights.get(index).copied().unwrap_or(1);
    let total: i128 = (0..options.len()).map(weight).sum();
    if total <= 0 {
        return None;
    }
    let draw = rng.random_range(0..total);
    let mut cumulative = 0;
    for (index, option) in options.iter().enumerate() {
        cumulative += weight(index);
        if draw < cumulative {
            return Some(option);
        }
    }
    options.last()
}
