use polars::prelude::*;
use rayon::prelude::*;
use std::io::Cursor;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::domain::{DashboardConfig, DashboardError};

/// One column of the Record Table, pre-rendered for display.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub name: String,
    pub dtype: DataType,
    pub data: Vec<String>,
    // Only set for numeric columns
    pub values: Option<Vec<Option<f64>>>,
}

impl TableColumn {
    pub fn is_numeric(&self) -> bool {
        self.values.is_some()
    }

    pub fn as_string(&self) -> String {
        format!(
            "\"{}\", {:?}, numeric: {}, # rows {}",
            self.name,
            self.dtype,
            self.is_numeric(),
            self.data.len(),
        )
    }
}

/// The loaded dataset: key column first, dropped column removed.
#[derive(Debug, Clone)]
pub struct RecordTable {
    name: String,
    key: String,
    frame: DataFrame,
    columns: Vec<TableColumn>,
}

/// Read only projection of the numeric, non key columns of a [`RecordTable`].
#[derive(Debug, Clone)]
pub struct NumericView {
    frame: DataFrame,
}

impl NumericView {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }
}

impl RecordTable {
    /// Loads the dataset named in the config. Remote sources get exactly one
    /// GET request, local sources are read from disk.
    pub async fn fetch(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let start_time = Instant::now();
        let source = config.data_source.as_str();
        let frame = if is_remote(source) {
            info!("Fetching dataset from {source} ...");
            let bytes = Self::download(source, config.fetch_timeout).await?;
            Self::parse_csv(bytes)?
        } else {
            info!("Reading dataset from {source} ...");
            Self::load_csv(Path::new(source))?
        };
        info!(
            "Loading data took {}ms ...",
            start_time.elapsed().as_millis()
        );

        let name = source
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("???")
            .to_string();
        Self::from_frame(name, frame, &config.key_column, &config.drop_column)
    }

    /// Builds the table from an already parsed frame, enforcing the key and
    /// drop column invariants.
    pub fn from_frame(
        name: String,
        frame: DataFrame,
        key: &str,
        drop: &str,
    ) -> Result<Self, DashboardError> {
        if !has_column(&frame, drop) {
            return Err(DashboardError::MissingColumn(drop.to_string()));
        }
        let frame = frame.drop(drop)?;

        if !has_column(&frame, key) {
            return Err(DashboardError::MissingColumn(key.to_string()));
        }
        let unique_keys = frame.column(key)?.n_unique()?;
        if unique_keys != frame.height() {
            return Err(DashboardError::DuplicateKey(key.to_string()));
        }

        // Move the key to the front so it becomes the leading, fixed column
        let mut order = vec![key.to_string()];
        order.extend(
            frame
                .get_column_names()
                .into_iter()
                .filter(|n| n.as_str() != key)
                .map(|n| n.to_string()),
        );
        let frame = frame.select(order)?;

        let columns: Result<Vec<TableColumn>, PolarsError> = frame
            .get_columns()
            .par_iter()
            .map(Self::load_column)
            .collect();
        let columns = columns?;
        for c in columns.iter() {
            debug!("Column: {}", c.as_string());
        }

        Ok(RecordTable {
            name,
            key: key.to_string(),
            frame,
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    #[cfg(test)]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numeric_view(&self) -> Result<NumericView, DashboardError> {
        let names: Vec<String> = self
            .frame
            .get_columns()
            .iter()
            .filter(|c| c.name().as_str() != self.key && is_numeric_type(c.dtype()))
            .map(|c| c.name().to_string())
            .collect();
        trace!("Numeric columns: {names:?}");
        let frame = self.frame.select(names)?;
        Ok(NumericView { frame })
    }

    async fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, DashboardError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let response = client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }

    fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame, DashboardError> {
        csv_options()
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| DashboardError::DataUnavailable(e.to_string()))
    }

    // Must stay eager, polars' lazy collect cannot run inside the tokio runtime.
    fn load_csv(path: &Path) -> Result<DataFrame, DashboardError> {
        if !path.is_file() {
            return Err(DashboardError::DataUnavailable(format!(
                "{} is not a readable file",
                path.display()
            )));
        }
        csv_options()
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| DashboardError::DataUnavailable(e.to_string()))
    }

    fn load_column(column: &Column) -> Result<TableColumn, PolarsError> {
        let dtype = column.dtype().clone();

        let as_text = column.cast(&DataType::String)?;
        let data = as_text
            .str()?
            .into_iter()
            .map(|value| match value {
                Some(s) => s.replace("\r\n", " ").replace('\n', " "),
                None => String::new(),
            })
            .collect();

        let values = if is_numeric_type(&dtype) {
            let as_float = column.cast(&DataType::Float64)?;
            let values = as_float
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Some(values)
        } else {
            None
        };

        Ok(TableColumn {
            name: column.name().to_string(),
            dtype,
            data,
            values,
        })
    }
}

/// Cell contents read as missing, the same set pandas treats as NA.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn csv_options() -> CsvReadOptions {
    let na_tokens: Vec<PlSmallStr> = NA_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect();
    CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|opts| opts.with_null_values(Some(NullValues::AllColumns(na_tokens.clone()))))
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_names().iter().any(|n| n.as_str() == name)
}

pub fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> String {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests/fixtures");
        path.push(name);
        path.to_string_lossy().into_owned()
    }

    fn config_for(source: &str) -> DashboardConfig {
        DashboardConfig::default().data_source(source)
    }

    fn small_frame() -> DataFrame {
        df!(
            "HBName" => ["Borders", "Fife", "Tayside"],
            "HBCode" => ["S08000016", "S08000029", "S08000030"],
            "rate" => [1.5, 2.5, 3.5],
            "count" => [10i64, 20, 30],
            "geometry" => ["POLYGON ((0 0))", "POLYGON ((1 1))", "POLYGON ((2 2))"],
        )
        .unwrap()
    }

    #[test]
    fn drops_geometry_and_moves_key_first() {
        let table =
            RecordTable::from_frame("t".into(), small_frame(), "HBCode", "geometry").unwrap();
        assert_eq!(table.column_names(), vec!["HBCode", "HBName", "rate", "count"]);
        assert!(!table.column_names().contains(&"geometry"));
        assert_eq!(table.key(), "HBCode");
        assert_eq!(table.height(), 3);
        assert_eq!(table.columns()[0].data[1], "S08000029");
    }

    #[test]
    fn numeric_view_keeps_numeric_columns_only() {
        let table =
            RecordTable::from_frame("t".into(), small_frame(), "HBCode", "geometry").unwrap();
        let view = table.numeric_view().unwrap();
        assert_eq!(view.column_names(), vec!["rate", "count"]);
        assert_eq!(view.frame().height(), table.height());
    }

    #[test]
    fn numeric_key_is_not_part_of_numeric_view() {
        let frame = df!(
            "id" => [1i64, 2, 3],
            "rate" => [1.0, 2.0, 3.0],
            "geometry" => ["a", "b", "c"],
        )
        .unwrap();
        let table = RecordTable::from_frame("t".into(), frame, "id", "geometry").unwrap();
        assert_eq!(table.numeric_view().unwrap().column_names(), vec!["rate"]);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let frame = df!(
            "HBCode" => ["S1", "S1"],
            "rate" => [1.0, 2.0],
            "geometry" => ["a", "b"],
        )
        .unwrap();
        let result = RecordTable::from_frame("t".into(), frame, "HBCode", "geometry");
        assert!(matches!(result, Err(DashboardError::DuplicateKey(k)) if k == "HBCode"));
    }

    #[test]
    fn missing_columns_are_rejected() {
        let result = RecordTable::from_frame("t".into(), small_frame(), "HBCode", "shape");
        assert!(matches!(result, Err(DashboardError::MissingColumn(c)) if c == "shape"));

        let result = RecordTable::from_frame("t".into(), small_frame(), "Code", "geometry");
        assert!(matches!(result, Err(DashboardError::MissingColumn(c)) if c == "Code"));
    }

    #[test]
    fn numeric_cells_keep_their_values() {
        let table =
            RecordTable::from_frame("t".into(), small_frame(), "HBCode", "geometry").unwrap();
        let count = &table.columns()[3];
        assert_eq!(
            count.values.as_deref(),
            Some(&[Some(10.0), Some(20.0), Some(30.0)][..])
        );
        assert!(!table.columns()[1].is_numeric());
    }

    #[tokio::test]
    async fn loads_local_csv_fixture() {
        let table = RecordTable::fetch(&config_for(&fixture("health_boards.csv")))
            .await
            .unwrap();
        assert_eq!(table.name(), "health_boards.csv");
        assert_eq!(table.height(), 4);
        assert_eq!(table.column_names()[0], "HBCode");
        assert!(!table.column_names().contains(&"geometry"));
        let numeric = table.numeric_view().unwrap();
        assert_eq!(
            numeric.column_names(),
            vec!["CancerPrevalence", "BowelScreeningUptake", "PopulationOver65"]
        );
    }

    #[tokio::test]
    async fn fixture_with_duplicate_keys_fails() {
        let result = RecordTable::fetch(&config_for(&fixture("duplicate_keys.csv"))).await;
        assert!(matches!(result, Err(DashboardError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn missing_local_dataset_is_unavailable() {
        let result = RecordTable::fetch(&config_for(&fixture("does_not_exist.csv"))).await;
        assert!(matches!(result, Err(DashboardError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn unreachable_url_is_unavailable() {
        // Bind and release a port so that nothing listens on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = format!("http://127.0.0.1:{port}/cancer_prev_mapped.csv");
        let config = config_for(&url).fetch_timeout(Duration::from_secs(2));
        let result = RecordTable::fetch(&config).await;
        assert!(matches!(result, Err(DashboardError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn pandas_na_tokens_are_missing_values() {
        let table = RecordTable::fetch(&config_for(&fixture("missing_values.csv")))
            .await
            .unwrap();
        let numeric = table.numeric_view().unwrap();
        assert_eq!(numeric.column_names(), vec!["uptake", "rate"]);

        let uptake = &table.columns()[2];
        assert_eq!(
            uptake.values.as_deref(),
            Some(&[Some(1.5), None, Some(2.5), None, Some(3.5)][..])
        );
        assert_eq!(uptake.data[1], "");
    }

    #[test]
    fn nan_cells_have_no_value() {
        let frame = df!(
            "HBCode" => ["A", "B"],
            "rate" => [1.0, f64::NAN],
            "geometry" => ["", ""],
        )
        .unwrap();
        let table = RecordTable::from_frame("t".into(), frame, "HBCode", "geometry").unwrap();
        assert_eq!(table.columns()[1].values.as_deref(), Some(&[Some(1.0), None][..]));
    }

    // Answers exactly one request on a local port and returns the dataset URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{addr}/cancer_prev_mapped.csv")
    }

    #[tokio::test]
    async fn remote_dataset_is_loaded() {
        let url = serve_once(
            "200 OK",
            "HBName,HBCode,rate,geometry\nNHS Fife,S08000029,10,POLYGON\nNHS Tayside,S08000030,NA,POLYGON\n",
        )
        .await;
        let table = RecordTable::fetch(&config_for(&url)).await.unwrap();
        assert_eq!(table.name(), "cancer_prev_mapped.csv");
        assert_eq!(table.height(), 2);
        assert_eq!(table.column_names(), vec!["HBCode", "HBName", "rate"]);
        assert_eq!(table.columns()[2].values.as_deref(), Some(&[Some(10.0), None][..]));
    }

    #[tokio::test]
    async fn error_status_is_unavailable() {
        let url = serve_once("404 Not Found", "no such dataset").await;
        let result = RecordTable::fetch(&config_for(&url)).await;
        assert!(matches!(result, Err(DashboardError::DataUnavailable(_))));
    }

    #[test]
    fn remote_sources_are_detected() {
        assert!(is_remote("https://example.org/data.csv"));
        assert!(is_remote("http://example.org/data.csv"));
        assert!(!is_remote("data/cancer_prev_mapped.csv"));
    }
}
