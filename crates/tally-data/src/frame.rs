//! Conversion between [`Table`] and polars `DataFrame`.

use crate::error::Result;
use crate::table::{Record, Table};
use polars::prelude::*;

impl Table {
    /// Convert to a `DataFrame` with one string column per table column.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns = self
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<Option<&str>> =
                    self.records().iter().map(|r| r.value(i)).collect();
                Column::new(name.as_str().into(), values)
            })
            .collect::<Vec<_>>();

        Ok(DataFrame::new(columns)?)
    }

    /// Build a table from a `DataFrame`, casting every column to strings.
    ///
    /// Null cells become missing values.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let names: Vec<String> = df
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(names.len()); df.height()];
        for column in df.get_columns() {
            let as_text = column.cast(&DataType::String)?;
            let chunked = as_text.as_materialized_series().str()?;
            for (row, value) in chunked.into_iter().enumerate() {
                cells[row].push(value.map(str::to_string));
            }
        }

        let mut table = Self::new(names)?;
        for (i, values) in cells.into_iter().enumerate() {
            table.push(Record::new(i + 1, values))?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_dataframe() {
        let table = Table::from_rows(
            ["rating", "temp"],
            [["1", "cold"], ["3", ""], ["5", "warm"]],
        )
        .unwrap();

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 2);
        assert_eq!(df.column("temp").unwrap().null_count(), 1);
    }

    #[test]
    fn test_from_dataframe_casts_numbers() {
        let df = DataFrame::new(vec![
            Column::new("year".into(), [2019i32, 2020, 2021]),
            Column::new("sex".into(), [Some("F"), None, Some("M")]),
        ])
        .unwrap();

        let table = Table::from_dataframe(&df).unwrap();
        assert_eq!(table.columns(), ["year".to_string(), "sex".to_string()]);
        assert_eq!(table.row(0).unwrap().get("year"), Some("2019"));
        assert_eq!(table.row(1).unwrap().get("sex"), None);
        assert_eq!(table.records()[2].line(), 3);
    }
}
