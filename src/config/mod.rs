use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::Date;

use crate::dsl::FilterPredicate;
use crate::model::{FilterCriteria, Metadata, VariableId, fields};

/// Filter configuration file (YAML).
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FiltersConfig {
    /// Coarse filter applied to networks at load time
    #[serde(default)]
    pub network_filters: String,
    /// Coarse filter applied to stations at load time
    #[serde(default)]
    pub station_filters: String,
    #[serde(default)]
    pub criteria: CriteriaConfig,
    /// GeoJSON area file, relative to the configuration file
    #[serde(default)]
    pub area: Option<PathBuf>,
}

impl FiltersConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read {}", path.display()))?;
        let mut config: FiltersConfig = settings
            .try_deserialize()
            .with_context(|| format!("Config: Invalid filter configuration in {}", path.display()))?;

        if let Some(area) = config.area.take() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.area = Some(base.join(area));
        }
        Ok(config)
    }

    pub fn compile(&self) -> CompiledFilters {
        CompiledFilters {
            networks: FilterPredicate::parse(&self.network_filters),
            stations: FilterPredicate::parse(&self.station_filters),
        }
    }
}

/// Coarse load-time filters, parsed once.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    pub networks: FilterPredicate,
    pub stations: FilterPredicate,
}

/// Criteria as written in the configuration. Omitted selections mean
/// "everything loaded"; an explicit empty list selects nothing.
#[derive(Debug, Deserialize, Serialize)]
pub struct CriteriaConfig {
    #[serde(default, with = "fields::opt_date")]
    pub start_date: Option<Date>,
    #[serde(default, with = "fields::opt_date")]
    pub end_date: Option<Date>,
    #[serde(default = "default_true")]
    pub include_stations_with_no_obs: bool,
    #[serde(default)]
    pub selected_networks: Option<Vec<String>>,
    #[serde(default)]
    pub selected_variables: Option<Vec<VariableId>>,
    #[serde(default)]
    pub selected_frequencies: Option<Vec<String>>,
    #[serde(default)]
    pub only_with_climatology: bool,
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            include_stations_with_no_obs: true,
            selected_networks: None,
            selected_variables: None,
            selected_frequencies: None,
            only_with_climatology: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl CriteriaConfig {
    /// Fill omitted selections from the loaded metadata.
    pub fn resolve(&self, metadata: &Metadata) -> FilterCriteria {
        let all = FilterCriteria::select_all(metadata);
        FilterCriteria {
            start_date: self.start_date,
            end_date: self.end_date,
            include_stations_with_no_obs: self.include_stations_with_no_obs,
            selected_networks: self
                .selected_networks
                .clone()
                .unwrap_or(all.selected_networks),
            selected_variables: self
                .selected_variables
                .clone()
                .unwrap_or(all.selected_variables),
            selected_frequencies: self
                .selected_frequencies
                .clone()
                .unwrap_or(all.selected_frequencies),
            only_with_climatology: self.only_with_climatology,
        }
    }
}
