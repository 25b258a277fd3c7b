//! Index and query metadata.
//!
//! [`IndexMeta`] is fixed at build time and travels with the graph;
//! [`QueryMeta`] describes the caller's query vector and must agree with the
//! index on data type and dimension before a search is admitted.

use crate::config;
use crate::distance::Metric;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Element type of vector payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit IEEE-754 floats, the only payload type this core interprets.
    F32,
}

/// Build-time description of an index: payload type, dimension, metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub data_type: DataType,
    pub dimension: usize,
    pub metric: Metric,
}

impl IndexMeta {
    pub fn new(dimension: usize, metric: Metric) -> Self {
        Self { data_type: DataType::F32, dimension, metric }
    }

    /// Reject queries whose shape disagrees with the index.
    pub fn check_query(&self, qmeta: &QueryMeta) -> Result<()> {
        if qmeta.data_type != self.data_type {
            return Err(Error::InvalidArgument(format!(
                "query data type {:?} does not match index {:?}",
                qmeta.data_type, self.data_type
            )));
        }
        if qmeta.dimension != self.dimension {
            return Err(Error::InvalidArgument(format!(
                "query dimension {} does not match index {}",
                qmeta.dimension, self.dimension
            )));
        }
        Ok(())
    }

    /// Validate build-time parameters.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 || self.dimension > config::MAX_DIMENSION {
            return Err(Error::InvalidArgument(format!(
                "dimension {} out of range 1..={}",
                self.dimension,
                config::MAX_DIMENSION
            )));
        }
        Ok(())
    }
}

/// Per-query description of the caller's vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryMeta {
    pub data_type: DataType,
    pub dimension: usize,
}

impl QueryMeta {
    pub fn f32(dimension: usize) -> Self {
        Self { data_type: DataType::F32, dimension }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_query_accepted() {
        let meta = IndexMeta::new(16, Metric::SquaredEuclidean);
        assert!(meta.check_query(&QueryMeta::f32(16)).is_ok());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let meta = IndexMeta::new(16, Metric::SquaredEuclidean);
        let err = meta.check_query(&QueryMeta::f32(32)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_dimension_invalid() {
        let meta = IndexMeta::new(0, Metric::SquaredEuclidean);
        assert!(meta.validate().is_err());
    }
}
