use crate::adapters::csv_grid::CsvGridDecoder;
use crate::adapters::http::HttpFetcher;
use crate::adapters::links::AnchorLinkLister;
use crate::adapters::local::LocalFetcher;
use crate::core::label::{LabelDateParser, MonthTable};
use crate::core::menu::MenuService;
use crate::core::period::{WeekLoader, MAX_SHEET_SIZE};
use crate::core::sheet::{SheetLayout, SpreadsheetDecoder};
use crate::core::text::TextNormalizer;
use crate::domain::ports::ByteFetcher;
use crate::utils::error::{MenuError, Result};
use crate::utils::validation::{self, Validate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://restaurant-seclin.atosworldline.com";
pub const DEFAULT_MENUS_URI: &str = "/WidgetPage.aspx?widgetId=35";
pub const DEFAULT_COOKIE: &str = "portal_url=restaurant-seclin.atosworldline.com/; language=FR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub source: SourceConfig,
    pub sheet: SheetConfig,
    pub calendar: CalendarConfig,
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// http(s) URL of the website, or a local directory holding a mirror.
    pub base_url: String,
    pub menus_uri: String,
    pub cookie: String,
    pub timeout_seconds: u64,
    pub label_prefix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            menus_uri: DEFAULT_MENUS_URI.to_string(),
            cookie: DEFAULT_COOKIE.to_string(),
            timeout_seconds: 30,
            label_prefix: "semaine".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub encoding: String,
    pub layout: SheetLayout,
    pub max_size_bytes: u64,
    pub delimiter: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            layout: SheetLayout::Compact,
            max_size_bytes: MAX_SHEET_SIZE,
            delimiter: ",".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub timezone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Paris".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub replacements: BTreeMap<String, String>,
}

impl MenuConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MenuError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MenuError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MENU_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MenuError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 是否從網站抓取 (否則視為本機目錄)
    pub fn is_remote(&self) -> bool {
        let base = self.source.base_url.to_ascii_lowercase();
        base.starts_with("http://") || base.starts_with("https://")
    }

    pub fn timezone(&self) -> Result<Tz> {
        validation::validate_timezone("calendar.timezone", &self.calendar.timezone)
    }

    fn delimiter(&self) -> Result<u8> {
        match self.sheet.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(MenuError::InvalidConfigValueError {
                field: "sheet.delimiter".to_string(),
                value: self.sheet.delimiter.clone(),
                reason: "Delimiter must be a single ASCII character".to_string(),
            }),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(MenuError::MissingConfigError {
                field: "source.base_url".to_string(),
            });
        }
        if self.is_remote() {
            validation::validate_url("source.base_url", &self.source.base_url)?;
        } else {
            validation::validate_path("source.base_url", &self.source.base_url)?;
        }
        validation::validate_non_empty_string("source.menus_uri", &self.source.menus_uri)?;
        validation::validate_non_empty_string("source.label_prefix", &self.source.label_prefix)?;
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 600)?;

        validation::validate_non_empty_string("sheet.encoding", &self.sheet.encoding)?;
        validation::validate_range(
            "sheet.max_size_bytes",
            self.sheet.max_size_bytes,
            1,
            MAX_SHEET_SIZE,
        )?;
        self.delimiter()?;

        self.timezone()?;
        Ok(())
    }

    fn fetcher(&self) -> Result<Arc<dyn ByteFetcher>> {
        if self.is_remote() {
            let fetcher = HttpFetcher::new(
                &self.source.base_url,
                Duration::from_secs(self.source.timeout_seconds),
            )?
            .with_cookie(self.source.cookie.clone());
            Ok(Arc::new(fetcher))
        } else {
            Ok(Arc::new(LocalFetcher::new(&self.source.base_url)))
        }
    }

    /// 依照配置組裝抓取、解碼與解析元件
    pub fn menu_service(&self) -> Result<MenuService> {
        let tz = self.timezone()?;
        let fetcher = self.fetcher()?;

        let normalizer = TextNormalizer::with_extra(self.normalizer.replacements.clone());
        let decoder = SpreadsheetDecoder::new(normalizer, self.sheet.layout, tz);
        let loader = WeekLoader::new(
            Arc::clone(&fetcher),
            Arc::new(CsvGridDecoder::new(self.delimiter()?)),
            decoder,
        )
        .with_encoding(self.sheet.encoding.clone())
        .with_max_size(self.sheet.max_size_bytes);

        Ok(MenuService::new(
            fetcher,
            Box::new(AnchorLinkLister::new(&self.source.label_prefix)?),
            LabelDateParser::new(MonthTable::french(), tz),
            Arc::new(loader),
            self.source.menus_uri.clone(),
        ))
    }
}

impl Validate for MenuConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
