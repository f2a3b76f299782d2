use anyhow::{anyhow, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use core_logic::TransferConfig;

/// Command-line values that take precedence over the file and the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub recipient: Option<String>,
    pub transactions: Option<usize>,
    pub amount: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Overrides {
    fn apply(&self, builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>> {
        let mut builder = builder;

        if let Some(recipient) = &self.recipient {
            builder = builder.set_override("batch.recipient", recipient.as_str())?;
        }
        if let Some(transactions) = self.transactions {
            builder = builder.set_override("batch.transactions", transactions as i64)?;
        }
        if let Some(value) = self.amount {
            builder = builder
                .set_override("batch.amount.mode", "fixed")?
                .set_override("batch.amount.value", value)?;
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                builder = builder
                    .set_override("batch.amount.mode", "random")?
                    .set_override("batch.amount.min", min)?
                    .set_override("batch.amount.max", max)?;
            }
            (None, None) => {}
            _ => return Err(anyhow!("--min and --max must be given together")),
        }

        Ok(builder)
    }
}

/// Layers, lowest first: the TOML file, `TRANSFER_*` variables
/// (e.g. `TRANSFER_BATCH__TRANSACTIONS=5`), then command-line overrides.
pub fn load(path: &str, overrides: &Overrides) -> Result<TransferConfig> {
    let builder = Config::builder().add_source(File::with_name(path)).add_source(
        Environment::with_prefix("TRANSFER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let settings = overrides.apply(builder)?.build()?;
    settings.try_deserialize().map_err(|e| anyhow!(e))
}
