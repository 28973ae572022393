use crate::domain::services::CleaningRules;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "small-harvest".to_string(),
            description: None,
        }
    }
}

/// Provider connection settings. Immutable once loaded; the page fetcher
/// takes its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub headers: BTreeMap<String, String>,
    /// Fixed filter parameters sent with every page request.
    pub parameters: BTreeMap<String, String>,
    pub page_param: String,
    pub page_size_param: String,
    /// Top-level response key holding the result list.
    pub results_key: String,
    /// Top-level response key holding the provider's total result count.
    /// When set and present, it takes precedence over the short-page heuristic.
    pub total_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.hh.ru/vacancies".to_string(),
            timeout_seconds: 30,
            headers: BTreeMap::from([(
                "User-Agent".to_string(),
                "small-harvest/0.1".to_string(),
            )]),
            parameters: BTreeMap::from([
                ("area".to_string(), "40".to_string()),
                ("text".to_string(), r#""python" AND "sql""#.to_string()),
            ]),
            page_param: "page".to_string(),
            page_size_param: "per_page".to_string(),
            results_key: "items".to_string(),
            total_key: None,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    pub page_size: usize,
    /// Highest zero-based page index that may be requested.
    pub max_pages: u32,
    /// Pause between consecutive page requests.
    pub rate_limit_ms: u64,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 19,
            rate_limit_ms: 2000,
        }
    }
}

impl HarvestSettings {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub fields: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let fields = [
            "id",
            "name",
            "employer.name",
            "employer.id",
            "employer.trusted",
            "area.name",
            "area.id",
            "address.raw",
            "salary.from",
            "salary.to",
            "salary.currency",
            "experience.name",
            "schedule.name",
            "employment.name",
            "published_at",
            "created_at",
            "archived",
            "description",
            "snippet.requirement",
            "snippet.responsibility",
        ];
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub filename: String,
    pub delimiter: char,
    pub compression: Option<CompressionConfig>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "_data/output".to_string(),
            filename: "output.csv".to_string(),
            delimiter: ',',
            compression: None,
        }
    }
}

impl LoadConfig {
    fn with_filename(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            ..Self::default()
        }
    }

    fn validate_section(&self) -> Result<()> {
        validation::validate_path("load.output_path", &self.output_path)?;
        validation::validate_non_empty_string("load.filename", &self.filename)?;
        validation::validate_delimiter("load.delimiter", self.delimiter)?;
        if let Some(compression) = self.compression.as_ref().filter(|c| c.enabled) {
            validation::validate_non_empty_string("load.compression.filename", &compression.filename)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

/// Paginated API harvest: fetch, project, write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub harvest: HarvestSettings,
    pub project: ProjectConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

impl HarvestConfig {
    /// The built-in vacancy harvest.
    pub fn builtin() -> Self {
        Self {
            pipeline: PipelineConfig {
                name: "hh-vacancies".to_string(),
                description: Some("Vacancies matching python AND sql in Kazakhstan".to_string()),
            },
            load: LoadConfig::with_filename("hh_data.csv"),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenSettings {
    pub record_path: Vec<String>,
    pub meta: Vec<String>,
    pub record_prefix: Option<String>,
    pub meta_prefix: Option<String>,
}

impl Default for FlattenSettings {
    fn default() -> Self {
        Self {
            record_path: vec!["projects".to_string(), "tasks".to_string()],
            meta: vec![
                "employee_id".to_string(),
                "name".to_string(),
                "projects.project_id".to_string(),
                "projects.name".to_string(),
            ],
            record_prefix: None,
            meta_prefix: None,
        }
    }
}

/// Nested JSON document expanded into one row per leaf element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenConfig {
    pub pipeline: PipelineConfig,
    pub input: InputConfig,
    pub flatten: FlattenSettings,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig {
                name: "employees-tasks".to_string(),
                description: None,
            },
            input: InputConfig {
                path: "_data/raw/employees_nested.json".to_string(),
            },
            flatten: FlattenSettings::default(),
            load: LoadConfig::with_filename("employees_tasks.csv"),
            monitoring: None,
        }
    }
}

/// Customer CSV export cleaned row by row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub pipeline: PipelineConfig,
    pub input: InputConfig,
    pub clean: CleaningRules,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig {
                name: "customers-cleaning".to_string(),
                description: None,
            },
            input: InputConfig {
                path: "_data/customers_raw.csv".to_string(),
            },
            clean: CleaningRules::default(),
            load: LoadConfig::with_filename("customers_clean.csv"),
            monitoring: None,
        }
    }
}

/// Loading shared by every pipeline configuration.
pub trait TomlFile: DeserializeOwned + Validate {
    /// 從 TOML 檔案載入配置
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|source| EtlError::InputError {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn monitoring_enabled(&self) -> bool;
}

/// 替換環境變數 (例如 ${API_KEY})；未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

fn validate_fields(field_name: &str, paths: &[String]) -> Result<()> {
    paths
        .iter()
        .try_for_each(|path| validation::validate_dotted_path(field_name, path))
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_positive_number(
            "source.timeout_seconds",
            self.source.timeout_seconds as usize,
            1,
        )?;
        for (name, value) in &self.source.headers {
            validation::parse_header("source.headers", name, value)?;
        }
        validation::validate_non_empty_string("source.results_key", &self.source.results_key)?;
        validation::validate_non_empty_string("source.page_param", &self.source.page_param)?;
        validation::validate_non_empty_string(
            "source.page_size_param",
            &self.source.page_size_param,
        )?;
        validation::validate_positive_number("harvest.page_size", self.harvest.page_size, 1)?;
        if self.project.fields.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "project.fields".to_string(),
            });
        }
        validate_fields("project.fields", &self.project.fields)?;
        self.load.validate_section()
    }
}

impl TomlFile for HarvestConfig {
    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for FlattenConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        for step in &self.flatten.record_path {
            validation::validate_non_empty_string("flatten.record_path", step)?;
        }
        validate_fields("flatten.meta", &self.flatten.meta)?;
        self.load.validate_section()
    }
}

impl TomlFile for FlattenConfig {
    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for CleaningConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_non_empty_string(
            "clean.email_domain_column",
            &self.clean.email_domain_column,
        )?;
        self.load.validate_section()
    }
}

impl TomlFile for CleaningConfig {
    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}
