//! Problem sizes and the performance-parameter search space.

use crate::spec::ParamAxis;
use annoforge_ir::params::{ParamValue, PerfParams};
use anyhow::{bail, Result};
use std::fmt;

/// Number of index combinations over axes with the given lengths, or
/// `None` if it does not fit in a `usize`.
pub fn checked_volume(lengths: &[usize]) -> Option<usize> {
    lengths.iter().try_fold(1usize, |acc, &len| acc.checked_mul(len))
}

/// Every index combination of axes with the given lengths, first axis
/// outermost. No axes yields a single empty combination; any empty axis
/// yields none.
pub fn list_all_combinations(lengths: &[usize]) -> Vec<Vec<usize>> {
    if lengths.iter().any(|&len| len == 0) {
        return Vec::new();
    }

    let mut combos = Vec::with_capacity(checked_volume(lengths).unwrap_or(0));
    let mut current = vec![0usize; lengths.len()];
    loop {
        combos.push(current.clone());

        let mut axis = lengths.len();
        loop {
            if axis == 0 {
                return combos;
            }
            axis -= 1;
            current[axis] += 1;
            if current[axis] < lengths[axis] {
                break;
            }
            current[axis] = 0;
        }
    }
}

/// One combination of input-parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemSize {
    pub values: Vec<(String, ParamValue)>,
    /// Position of each value within its axis.
    pub indices: Vec<usize>,
}

impl ProblemSize {
    pub fn key(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Values sorted by parameter name.
    pub fn sorted_values(&self) -> Vec<(&str, &ParamValue)> {
        let mut values: Vec<_> = self
            .values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        values.sort_by(|a, b| a.0.cmp(b.0));
        values
    }
}

impl fmt::Display for ProblemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return f.write_str("<none>");
        }
        f.write_str(&self.key())
    }
}

pub fn problem_sizes(axes: &[ParamAxis]) -> Result<Vec<ProblemSize>> {
    let lengths: Vec<usize> = axes.iter().map(|axis| axis.values.len()).collect();
    if checked_volume(&lengths).is_none() {
        bail!("too many problem sizes; reduce the input parameters");
    }
    let sizes: Vec<ProblemSize> = list_all_combinations(&lengths)
        .into_iter()
        .map(|indices| ProblemSize {
            values: axes
                .iter()
                .zip(&indices)
                .map(|(axis, &idx)| (axis.name.clone(), axis.values[idx].clone()))
                .collect(),
            indices,
        })
        .collect();

    if sizes.is_empty() {
        bail!("no valid problem sizes exist; check the input parameters");
    }
    Ok(sizes)
}

/// Coordinate system over the performance parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpace {
    pub axis_names: Vec<String>,
    pub axis_values: Vec<Vec<ParamValue>>,
}

impl SearchSpace {
    /// Build the space, removing duplicate values and sorting each axis.
    pub fn from_axes(axes: &[ParamAxis]) -> Self {
        let mut axis_names = Vec::with_capacity(axes.len());
        let mut axis_values = Vec::with_capacity(axes.len());
        for axis in axes {
            let mut values = axis.values.clone();
            values.sort();
            values.dedup();
            axis_names.push(axis.name.clone());
            axis_values.push(values);
        }
        Self {
            axis_names,
            axis_values,
        }
    }

    /// Number of points, failing when it overflows a `usize`.
    pub fn size(&self) -> Result<usize> {
        let lengths: Vec<usize> = self.axis_values.iter().map(Vec::len).collect();
        match checked_volume(&lengths) {
            Some(size) => Ok(size),
            None => bail!(
                "the performance parameter search space has more than {} points",
                usize::MAX
            ),
        }
    }

    /// Coordinate of the point at `index` in enumeration order, last axis
    /// fastest. `index` must be below [`size`](Self::size).
    pub fn coordinate_at(&self, mut index: usize) -> Vec<usize> {
        let mut coordinate = vec![0usize; self.axis_values.len()];
        for (slot, values) in coordinate.iter_mut().zip(&self.axis_values).rev() {
            let len = values.len().max(1);
            *slot = index % len;
            index /= len;
        }
        coordinate
    }

    pub fn params_at(&self, coordinate: &[usize]) -> PerfParams {
        self.axis_names
            .iter()
            .zip(&self.axis_values)
            .zip(coordinate)
            .map(|((name, values), &idx)| (name.clone(), values[idx].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<ParamValue> {
        values.iter().map(|&v| ParamValue::Int(v)).collect()
    }

    #[test]
    fn test_combinations_first_axis_outermost() {
        assert_eq!(
            list_all_combinations(&[2, 2]),
            vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]
        );
        assert_eq!(list_all_combinations(&[]), vec![Vec::<usize>::new()]);
        assert!(list_all_combinations(&[3, 0]).is_empty());
    }

    #[test]
    fn test_problem_sizes() {
        let axes = vec![
            ParamAxis::new("N", ints(&[10, 100])),
            ParamAxis::new("M", ints(&[5])),
        ];
        let sizes = problem_sizes(&axes).unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[1].indices, vec![1, 0]);
        assert_eq!(sizes[1].key(), "N=100,M=5");
        assert_eq!(sizes[1].sorted_values()[0].0, "M");
    }

    #[test]
    fn test_no_input_axes_is_one_empty_problem() {
        let sizes = problem_sizes(&[]).unwrap();
        assert_eq!(sizes.len(), 1);
        assert!(sizes[0].indices.is_empty());
        assert_eq!(sizes[0].to_string(), "<none>");
    }

    #[test]
    fn test_empty_input_axis_rejected() {
        let axes = vec![ParamAxis::new("N", Vec::new())];
        assert!(problem_sizes(&axes).is_err());
    }

    #[test]
    fn test_search_space_dedup_and_sort() {
        let space = SearchSpace::from_axes(&[
            ParamAxis::new("T", ints(&[32, 8, 32, 16])),
            ParamAxis::new("U", ints(&[2, 1])),
        ]);
        assert_eq!(space.axis_values[0], ints(&[8, 16, 32]));
        assert_eq!(space.size().unwrap(), 6);

        let params = space.params_at(&[2, 0]);
        assert_eq!(params["T"], ParamValue::Int(32));
        assert_eq!(params["U"], ParamValue::Int(1));
    }

    #[test]
    fn test_coordinate_decode_matches_enumeration() {
        let space = SearchSpace::from_axes(&[
            ParamAxis::new("A", ints(&[1, 2])),
            ParamAxis::new("B", ints(&[1, 2, 3])),
            ParamAxis::new("C", ints(&[1, 2])),
        ]);
        let decoded: Vec<Vec<usize>> = (0..space.size().unwrap())
            .map(|idx| space.coordinate_at(idx))
            .collect();
        assert_eq!(decoded, list_all_combinations(&[2, 3, 2]));
    }

    #[test]
    fn test_oversized_space_is_an_error() {
        let axes: Vec<ParamAxis> = (0..20)
            .map(|i| ParamAxis::new(format!("P{}", i), ints(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9])))
            .collect();
        let err = SearchSpace::from_axes(&axes).size().unwrap_err();
        assert!(err.to_string().contains("more than"));
        assert!(problem_sizes(&axes).is_err());
    }
}
