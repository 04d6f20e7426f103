//! Bounded, lazy Cartesian expansion of product variations.

use stockseed_core::Variations;

/// One attribute assignment, in attribute declaration order.
pub type Combination<'a> = Vec<(&'a str, &'a str)>;

/// Iterator over at most `cap` combinations of a variation map.
///
/// Walks the product like an odometer (last attribute fastest), so only the
/// current index vector is held regardless of the size of the full product.
#[derive(Debug, Clone)]
pub struct VariationCombinations<'a> {
    axes: Vec<(&'a str, &'a [String])>,
    indices: Vec<usize>,
    remaining: usize,
    exhausted: bool,
}

/// Expand `variations` into at most `cap` combinations.
///
/// An empty map yields exactly one empty combination, whatever `cap` is.
pub fn expand(variations: &Variations, cap: usize) -> VariationCombinations<'_> {
    let axes: Vec<(&str, &[String])> = variations
        .iter()
        .map(|(name, values)| (name, values.as_slice()))
        .collect();
    let exhausted = axes.iter().any(|(_, values)| values.is_empty());
    let remaining = if axes.is_empty() { 1 } else { cap };

    VariationCombinations {
        indices: vec![0; axes.len()],
        axes,
        remaining,
        exhausted,
    }
}

impl VariationCombinations<'_> {
    fn advance(&mut self) {
        for pos in (0..self.axes.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.axes[pos].1.len() {
                return;
            }
            self.indices[pos] = 0;
        }
        self.exhausted = true;
    }

    fn untaken(&self) -> usize {
        if self.exhausted {
            return 0;
        }
        // Mixed-radix position of the odometer, subtracted from the total.
        let mut total: usize = 1;
        let mut position: usize = 0;
        for ((_, values), index) in self.axes.iter().zip(&self.indices) {
            total = total.saturating_mul(values.len());
            position = position.saturating_mul(values.len()).saturating_add(*index);
        }
        total.saturating_sub(position)
    }
}

impl<'a> Iterator for VariationCombinations<'a> {
    type Item = Combination<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.remaining == 0 {
            return None;
        }

        let combination = self
            .axes
            .iter()
            .zip(&self.indices)
            .map(|((name, values), index)| (*name, values[*index].as_str()))
            .collect();

        self.remaining -= 1;
        self.advance();
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.untaken().min(self.remaining);
        (left, Some(left))
    }
}

/// `base` alone, or `base` followed by the attribute values.
pub fn format_product_name(base: &str, combination: &Combination<'_>) -> String {
    if combination.is_empty() {
        return base.to_string();
    }
    let values: Vec<&str> = combination.iter().map(|(_, value)| *value).collect();
    format!("{base} {}", values.join(" "))
}
