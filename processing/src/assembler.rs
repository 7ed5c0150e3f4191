//! One heatmap per parameter selection.
//!
//! The assembler borrows the load-time [`DataStore`] and rebuilds the
//! whole bundle on every call; nothing is cached between selections.

use courtmap_common::booking::{Grouping, YearSelector};
use courtmap_common::court::Court;
use courtmap_common::error::HeatmapError;
use courtmap_common::protocol::{DisplayOptions, HeatmapResponse};
use tracing::debug;

use crate::aggregate::count_slots;
use crate::filter::filter_year;
use crate::labels::{column_labels, row_labels};
use crate::matrix::UsageMatrix;
use crate::store::DataStore;
use crate::template::align;

/// The numeric part of a parameter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub court: Court,
    pub grouping: Grouping,
    pub year: YearSelector,
}

/// Everything a renderer needs for one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapBundle {
    pub selection: Selection,
    pub matrix: UsageMatrix,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub color_scale_max: u32,
}

impl HeatmapBundle {
    /// e.g. `Sports Hall Usage by Month – All Years`.
    pub fn title(&self) -> String {
        format!(
            "{} Usage by {} – {}",
            self.selection.court,
            self.selection.grouping,
            self.selection.year.title_label()
        )
    }

    /// Wire form, with the display hints passed through untouched.
    pub fn to_response(&self, display: DisplayOptions) -> HeatmapResponse {
        HeatmapResponse {
            title: self.title(),
            court: self.selection.court,
            group_by: self.selection.grouping,
            year: self.selection.year,
            row_labels: self.row_labels.clone(),
            col_labels: self.col_labels.clone(),
            counts: self.matrix.to_rows(),
            color_scale_max: self.color_scale_max,
            display,
        }
    }
}

pub struct MatrixAssembler<'a> {
    store: &'a DataStore,
}

impl<'a> MatrixAssembler<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    pub fn assemble(&self, selection: Selection) -> Result<HeatmapBundle, HeatmapError> {
        let Selection {
            court,
            grouping,
            year,
        } = selection;

        let profile = self.store.profile(court)?;
        let template = self.store.template(court, grouping)?;
        let dataset = self.store.dataset(court)?;

        let records = filter_year(dataset, year);
        let counts = count_slots(records.iter().copied(), grouping);
        let matrix = align(&counts, template, &selection)?;

        let row_labels = row_labels(court, profile, matrix.row_count())?;
        let col_labels = column_labels(template);
        let color_scale_max = self.store.color_scale().resolve(court, grouping, year)?;

        debug!(
            "Assembled {court} / {grouping} / {year}: {} bookings, {}×{} cells, vmax={color_scale_max}",
            records.len(),
            matrix.row_count(),
            matrix.col_count(),
        );

        Ok(HeatmapBundle {
            selection,
            matrix,
            row_labels,
            col_labels,
            color_scale_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::ColorScaleTable;
    use crate::store::{fixtures, CourtDataset};
    use chrono::{Month, Weekday};
    use courtmap_common::booking::Period;
    use courtmap_common::court::CourtTable;

    fn select(court: Court, grouping: Grouping, year: YearSelector) -> Selection {
        Selection {
            court,
            grouping,
            year,
        }
    }

    #[test]
    fn test_dimensions_match_template_for_every_selection() {
        let store = fixtures::store();
        let assembler = MatrixAssembler::new(&store);
        for court in Court::ALL {
            for grouping in Grouping::ALL {
                let bundle = assembler
                    .assemble(select(court, grouping, YearSelector::All))
                    .unwrap();
                let template = store.template(court, grouping).unwrap();
                assert_eq!(bundle.matrix.row_count(), template.row_count());
                assert_eq!(bundle.row_labels.len(), template.row_count());
                assert_eq!(bundle.matrix.col_count(), template.periods().len());
                assert_eq!(bundle.col_labels.len(), template.periods().len());
            }
        }
    }

    #[test]
    fn test_empty_year_is_all_zero() {
        let store = fixtures::store();
        let bundle = MatrixAssembler::new(&store)
            .assemble(select(
                Court::LawnTennis1,
                Grouping::Day,
                YearSelector::Year(2022),
            ))
            .unwrap();
        assert_eq!(bundle.matrix.total(), 0);
        assert_eq!(bundle.matrix.row_count(), 52);
        assert_eq!(
            bundle.col_labels,
            ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        );
        assert_eq!(bundle.row_labels[0], "09:00");
    }

    #[test]
    fn test_year_without_bookings_is_full_zero_grid() {
        let datasets = Court::ALL.map(|court| CourtDataset {
            court,
            records: Vec::new(),
        });
        let store = DataStore::new(
            CourtTable::standard(),
            fixtures::templates(),
            fixtures::color_scale(),
            datasets,
        );
        let bundle = MatrixAssembler::new(&store)
            .assemble(select(
                Court::LawnTennis1,
                Grouping::Day,
                YearSelector::Year(2024),
            ))
            .unwrap();
        let rows = bundle.matrix.to_rows();
        assert_eq!(rows.len(), 52);
        for row in &rows {
            assert_eq!(row, &vec![0; 7]);
        }
        assert_eq!(bundle.row_labels.len(), 52);
        assert_eq!(bundle.col_labels.len(), 7);
        assert_eq!(bundle.color_scale_max, 40);
    }

    #[test]
    fn test_counts_land_in_their_cells() {
        let store = fixtures::store();
        let bundle = MatrixAssembler::new(&store)
            .assemble(select(
                Court::LawnTennis1,
                Grouping::Day,
                YearSelector::Year(2024),
            ))
            .unwrap();
        let m = &bundle.matrix;
        assert_eq!(m.cell(3, Period::Day(Weekday::Tue)), Some(1));
        assert_eq!(m.cell(3, Period::Day(Weekday::Wed)), Some(1));
        let row: Vec<u32> = m.rows().nth(3).unwrap().to_vec();
        assert_eq!(row, vec![0, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_conservation_of_counts() {
        let store = fixtures::store();
        let assembler = MatrixAssembler::new(&store);
        let dataset = store.dataset(Court::LawnTennis1).unwrap();
        for year in [
            YearSelector::All,
            YearSelector::Year(2023),
            YearSelector::Year(2024),
            YearSelector::Year(2025),
        ] {
            for grouping in Grouping::ALL {
                let bundle = assembler
                    .assemble(select(Court::LawnTennis1, grouping, year))
                    .unwrap();
                let expected = filter_year(dataset, year).len() as u64;
                assert_eq!(bundle.matrix.total(), expected, "{year} {grouping}");
            }
        }
    }

    #[test]
    fn test_year_matrices_add_up_to_all() {
        let store = fixtures::store();
        let assembler = MatrixAssembler::new(&store);
        for grouping in Grouping::ALL {
            let all = assembler
                .assemble(select(Court::LawnTennis1, grouping, YearSelector::All))
                .unwrap()
                .matrix
                .to_rows();

            let mut summed = vec![vec![0u32; all[0].len()]; all.len()];
            for year in [2023, 2024, 2025] {
                let rows = assembler
                    .assemble(select(Court::LawnTennis1, grouping, YearSelector::Year(year)))
                    .unwrap()
                    .matrix
                    .to_rows();
                for (acc, row) in summed.iter_mut().zip(rows) {
                    for (a, v) in acc.iter_mut().zip(row) {
                        *a += v;
                    }
                }
            }
            assert_eq!(summed, all, "{grouping}");
        }
    }

    #[test]
    fn test_idempotent() {
        let store = fixtures::store();
        let assembler = MatrixAssembler::new(&store);
        let sel = select(Court::LawnTennis1, Grouping::Month, YearSelector::All);
        assert_eq!(assembler.assemble(sel).unwrap(), assembler.assemble(sel).unwrap());
    }

    #[test]
    fn test_scale_uses_year_then_all() {
        let mut scale = fixtures::color_scale();
        scale.insert(YearSelector::Year(2024), "Lawn_Tennis_Court_1_Day", 12);
        let datasets = Court::ALL.map(|court| CourtDataset {
            court,
            records: Vec::new(),
        });
        let store = DataStore::new(CourtTable::standard(), fixtures::templates(), scale, datasets);
        let assembler = MatrixAssembler::new(&store);

        let bundle = assembler
            .assemble(select(Court::LawnTennis1, Grouping::Day, YearSelector::Year(2024)))
            .unwrap();
        assert_eq!(bundle.color_scale_max, 12);
        let bundle = assembler
            .assemble(select(Court::LawnTennis1, Grouping::Day, YearSelector::Year(2025)))
            .unwrap();
        assert_eq!(bundle.color_scale_max, 40);
    }

    #[test]
    fn test_cells_may_exceed_ceiling() {
        let mut scale = ColorScaleTable::new();
        for court in Court::ALL {
            for grouping in Grouping::ALL {
                scale.insert(YearSelector::All, court.scale_column(grouping), 1);
            }
        }
        let records = vec![fixtures::record(2024, 0, Weekday::Mon, Month::April); 5];
        let datasets = Court::ALL.map(|court| CourtDataset {
            court,
            records: records.clone(),
        });
        let store = DataStore::new(CourtTable::standard(), fixtures::templates(), scale, datasets);
        let bundle = MatrixAssembler::new(&store)
            .assemble(select(Court::SquashC, Grouping::Month, YearSelector::All))
            .unwrap();
        assert_eq!(bundle.color_scale_max, 1);
        assert_eq!(bundle.matrix.max(), 5);
    }

    #[test]
    fn test_integrity_error_names_the_selection() {
        let datasets = Court::ALL.map(|court| CourtDataset {
            court,
            records: vec![fixtures::record(2024, 75, Weekday::Fri, Month::March)],
        });
        let store = DataStore::new(
            CourtTable::standard(),
            fixtures::templates(),
            fixtures::color_scale(),
            datasets,
        );
        let err = MatrixAssembler::new(&store)
            .assemble(select(Court::SportsHall, Grouping::Day, YearSelector::Year(2024)))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Sports Hall"));
        assert!(msg.contains("Day"));
        assert!(msg.contains("2024"));
        assert_eq!(err.kind(), courtmap_common::error::ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_title_and_response() {
        let store = fixtures::store();
        let bundle = MatrixAssembler::new(&store)
            .assemble(select(Court::LawnTennis1, Grouping::Day, YearSelector::All))
            .unwrap();
        assert_eq!(bundle.title(), "Lawn Tennis Court 1 Usage by Day – All Years");

        let display = DisplayOptions {
            height: 12,
            width: 18,
            cell_totals: true,
        };
        let resp = bundle.to_response(display);
        assert_eq!(resp.display, display);
        assert_eq!(resp.counts.len(), 52);
        assert_eq!(resp.counts[3][1], 3);
        assert_eq!(resp.counts[3][2], 1);
        assert_eq!(resp.color_scale_max, 40);
    }
}
