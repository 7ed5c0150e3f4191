//! Load-time tables, immutable once built.

use std::collections::HashMap;

use courtmap_common::booking::{BookingRecord, Grouping};
use courtmap_common::court::{Court, CourtProfile, CourtTable, SlotClass};
use courtmap_common::error::HeatmapError;

use crate::color_scale::ColorScaleTable;
use crate::template::BlankTemplate;

/// Every booking recorded for one court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtDataset {
    pub court: Court,
    pub records: Vec<BookingRecord>,
}

/// Court table, blank templates, colour-scale table and datasets.
///
/// Built once at startup and shared by reference with every assembly.
#[derive(Debug, Clone)]
pub struct DataStore {
    courts: CourtTable,
    templates: HashMap<(SlotClass, Grouping), BlankTemplate>,
    color_scale: ColorScaleTable,
    datasets: HashMap<Court, CourtDataset>,
}

impl DataStore {
    /// Assemble a store from in-memory tables. No cross-checks are made;
    /// call [`DataStore::validate`] for those.
    pub fn new(
        courts: CourtTable,
        templates: impl IntoIterator<Item = BlankTemplate>,
        color_scale: ColorScaleTable,
        datasets: impl IntoIterator<Item = CourtDataset>,
    ) -> Self {
        Self {
            courts,
            templates: templates
                .into_iter()
                .map(|t| ((t.class(), t.grouping()), t))
                .collect(),
            color_scale,
            datasets: datasets.into_iter().map(|d| (d.court, d)).collect(),
        }
    }

    pub fn courts(&self) -> &CourtTable {
        &self.courts
    }

    pub fn color_scale(&self) -> &ColorScaleTable {
        &self.color_scale
    }

    pub fn profile(&self, court: Court) -> Result<&CourtProfile, HeatmapError> {
        self.courts.profile(court)
    }

    /// The blank template for a court's slot class and a grouping.
    pub fn template(&self, court: Court, grouping: Grouping) -> Result<&BlankTemplate, HeatmapError> {
        let class = self.profile(court)?.class;
        self.templates
            .get(&(class, grouping))
            .ok_or_else(|| HeatmapError::MissingTemplate {
                court: court.display_name().to_string(),
                grouping: grouping.to_string(),
                template: class.template_key(grouping),
            })
    }

    pub fn dataset(&self, court: Court) -> Result<&CourtDataset, HeatmapError> {
        self.datasets
            .get(&court)
            .ok_or_else(|| HeatmapError::MissingDataset {
                court: court.display_name().to_string(),
            })
    }

    /// Referential checks across the tables, stopping at the first
    /// violation: every court is mapped, has a dataset and a template per
    /// grouping, and has an "All" colour-scale entry per grouping.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        self.courts.validate()?;
        for court in Court::ALL {
            self.dataset(court)?;
            for grouping in Grouping::ALL {
                let template = self.template(court, grouping)?;
                if template.row_count() != template.class().row_count() {
                    return Err(HeatmapError::TemplateRowCount {
                        template: template.key(),
                        expected: template.class().row_count(),
                        actual: template.row_count(),
                    });
                }
                if !self.color_scale.has_fallback(court, grouping) {
                    return Err(HeatmapError::MissingScaleFallback {
                        court: court.display_name().to_string(),
                        grouping: grouping.to_string(),
                        year: "All".to_string(),
                        column: court.scale_column(grouping),
                    });
                }
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;
    use courtmap_common::booking::YearSelector;

    #[test]
    fn test_fixture_store_is_valid() {
        fixtures::store().validate().unwrap();
    }

    #[test]
    fn test_template_follows_court_class() {
        let store = fixtures::store();
        let t = store.template(Court::LawnTennis2, Grouping::Month).unwrap();
        assert_eq!(t.key(), "blank_52_month");
        let t = store.template(Court::SquashEGlass, Grouping::Day).unwrap();
        assert_eq!(t.key(), "blank_60_day");
    }

    #[test]
    fn test_missing_template() {
        let store = DataStore::new(
            CourtTable::standard(),
            vec![BlankTemplate::full(SlotClass::Step60, Grouping::Day)],
            fixtures::color_scale(),
            Vec::new(),
        );
        assert!(store.template(Court::SportsHall, Grouping::Day).is_ok());
        let err = store.template(Court::LawnTennis1, Grouping::Day).unwrap_err();
        assert!(matches!(err, HeatmapError::MissingTemplate { .. }));
        assert!(matches!(
            store.validate().unwrap_err(),
            HeatmapError::MissingDataset { .. }
        ));
    }

    #[test]
    fn test_validate_requires_scale_fallback() {
        let mut scale = ColorScaleTable::new();
        scale.insert(YearSelector::Year(2024), Court::RealTennis.scale_column(Grouping::Day), 10);
        let datasets = Court::ALL.map(|court| CourtDataset {
            court,
            records: Vec::new(),
        });
        let store = DataStore::new(CourtTable::standard(), fixtures::templates(), scale, datasets);
        let err = store.validate().unwrap_err();
        assert!(matches!(err, HeatmapError::MissingScaleFallback { .. }));
    }

    #[test]
    fn test_validate_rejects_unmapped_court() {
        let courts = CourtTable::from_entries(
            CourtTable::standard()
                .iter()
                .filter(|(c, _)| *c != Court::SquashF)
                .map(|(c, p)| (c, *p))
                .collect::<Vec<_>>(),
        );
        let datasets = Court::ALL.map(|court| CourtDataset {
            court,
            records: Vec::new(),
        });
        let store = DataStore::new(courts, fixtures::templates(), fixtures::color_scale(), datasets);
        assert_eq!(
            store.validate().unwrap_err(),
            HeatmapError::UnmappedCourt {
                court: "Squash F Court".into()
            }
        );
    }
}
