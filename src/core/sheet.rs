use crate::core::label::day_bounds;
use crate::core::text::TextNormalizer;
use crate::domain::model::{Day, Meal, Meals};
use crate::utils::error::{MenuError, Result};
use chrono::{DateTime, Days};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Published sheet layouts. They differ by the number of header rows placed
/// above the first meal-type row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetLayout {
    #[default]
    Compact,
    Legacy,
}

impl SheetLayout {
    pub const COMPACT_HEADER_ROWS: usize = 4;
    pub const LEGACY_HEADER_ROWS: usize = 6;

    pub fn header_rows(self) -> usize {
        match self {
            SheetLayout::Compact => Self::COMPACT_HEADER_ROWS,
            SheetLayout::Legacy => Self::LEGACY_HEADER_ROWS,
        }
    }
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Drops fully blank rows at both ends of the grid. Interior blank rows stay.
pub fn trim_sheet(grid: &[Vec<String>]) -> &[Vec<String>] {
    let first = grid.iter().position(|row| !is_blank_row(row));
    let last = grid.iter().rposition(|row| !is_blank_row(row));
    match (first, last) {
        (Some(first), Some(last)) => &grid[first..=last],
        _ => &[],
    }
}

fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Decodes a week sheet: one meal-type label column followed by a
/// `(name, price)` column pair per day.
#[derive(Debug, Clone)]
pub struct SpreadsheetDecoder {
    normalizer: TextNormalizer,
    layout: SheetLayout,
    tz: Tz,
}

impl SpreadsheetDecoder {
    pub fn new(normalizer: TextNormalizer, layout: SheetLayout, tz: Tz) -> Self {
        Self {
            normalizer,
            layout,
            tz,
        }
    }

    pub fn decode(&self, grid: &[Vec<String>], period_start: &DateTime<Tz>) -> Result<Vec<Day>> {
        let rows = trim_sheet(grid);
        let header_rows = self.layout.header_rows();

        if rows.len() < header_rows {
            return Err(MenuError::InvalidShapeError {
                reason: format!(
                    "expected at least {} rows, found {}",
                    header_rows,
                    rows.len()
                ),
            });
        }

        // 以最寬的列為準，較短的列視為空白儲存格
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width < 3 {
            return Err(MenuError::InvalidShapeError {
                reason: format!("expected at least 3 columns, found {}", width),
            });
        }
        if (width - 1) % 2 != 0 {
            return Err(MenuError::InvalidShapeError {
                reason: format!(
                    "expected a label column followed by name/price pairs, found {} columns",
                    width
                ),
            });
        }

        let day_count = (width - 1) / 2;
        let first_date = period_start.with_timezone(&self.tz).date_naive();

        let mut days = Vec::with_capacity(day_count);
        for d in 0..day_count {
            let date = first_date
                .checked_add_days(Days::new(d as u64))
                .ok_or_else(|| MenuError::InvalidShapeError {
                    reason: format!("day {} is out of the calendar range", d),
                })?;
            let (start, end) =
                day_bounds(&self.tz, date).ok_or_else(|| MenuError::DecodeError {
                    message: format!("no valid day bounds for {}", date),
                })?;
            days.push(Day {
                start,
                end,
                meals: Meals::new(),
            });
        }

        for row in &rows[header_rows..] {
            let meal_type = self.normalizer.smooth_grammar(cell(row, 0).trim());

            for (d, day) in days.iter_mut().enumerate() {
                let name = cell(row, 1 + 2 * d).trim();
                if name.is_empty() {
                    continue;
                }

                day.meals.push(
                    &meal_type,
                    Meal {
                        name: self.normalizer.smooth_grammar(name),
                        price: self.normalizer.parse_price(cell(row, 2 + 2 * d)),
                    },
                );
            }
        }

        tracing::debug!(
            "Decoded {} days from {} meal-type rows",
            days.len(),
            rows.len() - header_rows
        );
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};
    use chrono_tz::Europe::Paris;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn decoder() -> SpreadsheetDecoder {
        SpreadsheetDecoder::new(TextNormalizer::default(), SheetLayout::Compact, Paris)
    }

    fn week_start() -> DateTime<Tz> {
        Paris.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap()
    }

    fn sample_grid() -> Vec<Vec<String>> {
        grid(&[
            &["", "", "", "", ""],
            &["Restaurant", "", "", "", ""],
            &["Menu de la semaine", "", "", "", ""],
            &["", "Lundi", "", "Mardi", ""],
            &["", "Nom", "Prix", "Nom", "Prix"],
            &["Plat du Jour", "Poulet roti basquaise", "4,50", "Couscous", "520"],
            &["Trattoria", "Pates carbonara", "CJ", "", ""],
            &["Bar a Legumes", "Puree", "", "Haricots", "1,20"],
            &["Bar a Legumes", "Carottes", "0,90", "", ""],
        ])
    }

    #[test]
    fn test_trim_sheet() {
        let g = grid(&[
            &["", " "],
            &["a", ""],
            &["", ""],
            &["b", "c"],
            &["  ", ""],
            &[],
        ]);
        let trimmed = trim_sheet(&g);
        assert_eq!(trimmed.len(), 3);
        assert_eq!(trimmed[0][0], "a");
        assert!(is_blank_row(&trimmed[1]));
        assert_eq!(trimmed[2][1], "c");

        let blank = grid(&[&["", ""], &[" "]]);
        assert!(trim_sheet(&blank).is_empty());
    }

    #[test]
    fn test_decode_sample_week() {
        let days = decoder().decode(&sample_grid(), &week_start()).unwrap();
        assert_eq!(days.len(), 2);

        let monday = &days[0];
        assert_eq!(monday.start, week_start());
        assert_eq!(monday.end.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(monday.end.nanosecond(), 999_999_999);
        assert_eq!(
            monday.meals.meal_types(),
            ["Plat du Jour", "Trattoria", "Bar a Légumes"]
        );
        assert_eq!(
            monday.meals.get("Plat du Jour").unwrap(),
            [Meal {
                name: "Poulet rôti basquaise".to_string(),
                price: Some(450)
            }]
        );
        assert_eq!(
            monday.meals.get("Trattoria").unwrap(),
            [Meal {
                name: "Pâtes carbonara".to_string(),
                price: None
            }]
        );
        let sides = monday.meals.get("Bar a Légumes").unwrap();
        assert_eq!(sides.len(), 2);
        assert_eq!(sides[0].name, "Purée");
        assert_eq!(sides[1].price, Some(90));

        let tuesday = &days[1];
        assert_eq!(
            tuesday.start,
            Paris.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap()
        );
        assert_eq!(tuesday.meals.len(), 2);
        assert!(tuesday.meals.get("Trattoria").is_none());
        assert_eq!(tuesday.meals.get("Bar a Légumes").unwrap().len(), 1);
    }

    #[test]
    fn test_decode_ragged_rows() {
        let g = grid(&[
            &["h1"],
            &["h2"],
            &["h3"],
            &["h4", "", "", "", ""],
            &["Dessert", "Tarte"],
        ]);
        let days = decoder().decode(&g, &week_start()).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].meals.get("Dessert").unwrap()[0].price, None);
        assert!(days[1].meals.is_empty());
    }

    #[test]
    fn test_decode_header_only_sheet() {
        let g = grid(&[&["h", "", ""], &["h", "", ""], &["h", "", ""], &["h", "", ""]]);
        let days = decoder().decode(&g, &week_start()).unwrap();
        assert_eq!(days.len(), 1);
        assert!(days[0].meals.is_empty());
    }

    #[test]
    fn test_decode_invalid_shapes() {
        let too_short = grid(&[&["h", "", ""], &["h", "", ""], &["h", "", ""]]);
        let too_narrow = grid(&[&["h", ""], &["h", ""], &["h", ""], &["h", ""]]);
        let odd_pairs = grid(&[
            &["h", "", "", ""],
            &["h", "", "", ""],
            &["h", "", "", ""],
            &["h", "", "", ""],
        ]);

        for g in [too_short, too_narrow, odd_pairs, Vec::new()] {
            let err = decoder().decode(&g, &week_start()).unwrap_err();
            assert!(matches!(err, MenuError::InvalidShapeError { .. }));
        }
    }

    #[test]
    fn test_decode_legacy_layout() {
        let legacy = SpreadsheetDecoder::new(TextNormalizer::default(), SheetLayout::Legacy, Paris);
        let days = legacy.decode(&sample_grid(), &week_start()).unwrap();

        // 前六列都是表頭
        assert_eq!(days[0].meals.meal_types(), ["Bar a Légumes"]);
        assert_eq!(days[0].meals.get("Bar a Légumes").unwrap().len(), 2);
    }

    #[test]
    fn test_decode_month_rollover() {
        let start = Paris.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap();
        let days = decoder().decode(&sample_grid(), &start).unwrap();
        assert_eq!(days[1].start.date_naive(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }
}
