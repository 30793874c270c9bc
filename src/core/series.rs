use std::collections::HashMap;

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;
use tracing::debug;

use crate::core::scale::{DomainKey, Scale};
use crate::core::{Datum, DatumValue, Serie};

/// Pixel position inside the inner drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A raw datum together with its placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedDatum {
    pub data: Datum,
    /// Index of the datum within its series.
    pub index: usize,
    /// Cumulative y value when the y scale is stacked.
    pub y_stacked: Option<f64>,
    /// `None` when x or y cannot be mapped to a finite pixel.
    pub position: Option<Position>,
}

/// Cumulative y values per series, accumulated across series sharing an x.
///
/// A datum whose y is not numeric breaks nothing: it gets no stacked value
/// and does not contribute to the running total.
#[must_use]
pub fn stack_y_values(series: &[Serie]) -> Vec<Vec<Option<f64>>> {
    let mut totals: HashMap<DomainKey, f64> = HashMap::new();
    series
        .iter()
        .map(|serie| {
            serie
                .data
                .iter()
                .map(|datum| {
                    let y = datum.y.as_f64().filter(|y| y.is_finite())?;
                    let total = totals.entry(DomainKey::from(&datum.x)).or_insert(0.0);
                    *total += y;
                    Some(*total)
                })
                .collect()
        })
        .collect()
}

/// Values the y scale is computed from: stacked totals or raw y values.
#[must_use]
pub fn y_domain_values(series: &[Serie], stacked: Option<&[Vec<Option<f64>>]>) -> Vec<DatumValue> {
    match stacked {
        Some(stacked) => stacked
            .iter()
            .flatten()
            .flatten()
            .copied()
            .map(DatumValue::Number)
            .collect(),
        None => series
            .iter()
            .flat_map(|serie| serie.data.iter().map(|datum| datum.y.clone()))
            .collect(),
    }
}

#[must_use]
pub fn x_domain_values(series: &[Serie]) -> Vec<DatumValue> {
    series
        .iter()
        .flat_map(|serie| serie.data.iter().map(|datum| datum.x.clone()))
        .collect()
}

/// Places every datum of every series on the two scales.
#[must_use]
pub fn compute_series_data(
    series: &[Serie],
    x_scale: &Scale,
    y_scale: &Scale,
    stacked: Option<&[Vec<Option<f64>>]>,
) -> Vec<Vec<ComputedDatum>> {
    let project = |(serie_index, serie): (usize, &Serie)| {
        let stacked_values = stacked.and_then(|stacked| stacked.get(serie_index));
        project_serie(serie, x_scale, y_scale, stacked_values)
    };

    #[cfg(feature = "parallel-projection")]
    {
        series.par_iter().enumerate().map(project).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        series.iter().enumerate().map(project).collect()
    }
}

fn project_serie(
    serie: &Serie,
    x_scale: &Scale,
    y_scale: &Scale,
    stacked: Option<&Vec<Option<f64>>>,
) -> Vec<ComputedDatum> {
    let computed: Vec<ComputedDatum> = serie
        .data
        .iter()
        .enumerate()
        .map(|(index, datum)| {
            let y_stacked = stacked.and_then(|values| values.get(index).copied().flatten());
            let x = x_scale.map(&datum.x);
            let y = match stacked {
                Some(_) => y_stacked.and_then(|value| y_scale.map_number(value)),
                None => y_scale.map(&datum.y),
            };
            let position = match (x, y) {
                (Some(x), Some(y)) => Some(Position { x, y }),
                _ => None,
            };
            ComputedDatum {
                data: datum.clone(),
                index,
                y_stacked,
                position,
            }
        })
        .collect();

    let skipped = computed.iter().filter(|datum| datum.position.is_none()).count();
    if skipped > 0 {
        debug!(serie = %serie.id, skipped, "datums without a finite position are not drawn");
    }
    computed
}
