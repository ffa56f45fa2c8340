use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//disparity index strategy parameters
//defaults follow the reference tool: length 29, short 27, long 81
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisparityParams {
    pub length: usize,
    pub short_period: usize,
    pub long_period: usize,
}

impl Default for DisparityParams {
    fn default() -> Self {
        DisparityParams {
            length: 29,
            short_period: 27,
            long_period: 81,
        }
    }
}

impl DisparityParams {
    //compact label used to key sweep results
    pub fn label(&self) -> String {
        format!(
            "L={} short={} long={}",
            self.length, self.short_period, self.long_period
        )
    }
}

//parameter grid for a sweep run
//each axis is a list of candidate values; combinations with
//short_period >= long_period are invalid strategies and are skipped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepGrid {
    pub lengths: Vec<usize>,
    pub short_periods: Vec<usize>,
    pub long_periods: Vec<usize>,
}

impl SweepGrid {
    //expands the grid into the valid parameter combinations, in axis order
    pub fn combinations(&self) -> Vec<DisparityParams> {
        let mut combos = Vec::new();

        for &length in &self.lengths {
            for &short_period in &self.short_periods {
                for &long_period in &self.long_periods {
                    if short_period < long_period {
                        combos.push(DisparityParams {
                            length,
                            short_period,
                            long_period,
                        });
                    }
                }
            }
        }

        combos
    }
}

//complete backtest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfiguration {
    //data
    pub data_path: PathBuf,
    pub symbol: String,

    //account settings
    pub initial_capital: f64,

    //strategy
    pub params: DisparityParams,

    //optional output paths
    pub output_indicator_csv: Option<PathBuf>,
    pub output_trades_csv: Option<PathBuf>,
}

impl Default for BacktestConfiguration {
    fn default() -> Self {
        BacktestConfiguration {
            data_path: PathBuf::from("data.csv"),
            symbol: "RELIANCE".to_string(),
            initial_capital: 100_000.0,
            params: DisparityParams::default(),
            output_indicator_csv: None,
            output_trades_csv: None,
        }
    }
}

impl BacktestConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BacktestConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_reference_tool() {
        let params = DisparityParams::default();
        assert_eq!(params.length, 29);
        assert_eq!(params.short_period, 27);
        assert_eq!(params.long_period, 81);
    }

    #[test]
    fn grid_skips_invalid_period_pairs() {
        let grid = SweepGrid {
            lengths: vec![5],
            short_periods: vec![3, 10, 15],
            long_periods: vec![10, 20],
        };

        let combos = grid.combinations();

        //3<10, 3<20, 10<20, 15<20 survive; 10>=10 and 15>=10 vs 10 are dropped
        assert_eq!(combos.len(), 4);
        assert!(combos
            .iter()
            .all(|params| params.short_period < params.long_period));
    }

    #[test]
    fn grid_expansion_is_ordered_and_deterministic() {
        let grid = SweepGrid {
            lengths: vec![5, 10],
            short_periods: vec![3],
            long_periods: vec![9],
        };

        let combos = grid.combinations();
        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].length, 5);
        assert_eq!(combos[1].length, 10);
        assert_eq!(combos, grid.combinations());
    }

    #[test]
    fn json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = BacktestConfiguration {
            data_path: PathBuf::from("prices.csv"),
            symbol: "TCS".to_string(),
            initial_capital: 250_000.0,
            params: DisparityParams {
                length: 20,
                short_period: 9,
                long_period: 26,
            },
            output_indicator_csv: Some(PathBuf::from("indicator.csv")),
            output_trades_csv: None,
        };

        config.to_json_file(&path).unwrap();
        let loaded = BacktestConfiguration::from_json_file(&path).unwrap();

        assert_eq!(loaded.symbol, "TCS");
        assert_eq!(loaded.params, config.params);
        assert_eq!(loaded.output_indicator_csv, config.output_indicator_csv);
    }
}
