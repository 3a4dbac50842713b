use chrono::{DateTime, Local};
use postura_vision::PostureReport;
use serde::Serialize;
use uuid::Uuid;

/// One analyzed photograph, stamped for export.
#[derive(Debug, Clone, Serialize)]
pub struct Examination {
    pub id: Uuid,
    pub taken_at: DateTime<Local>,
    pub report: PostureReport,
}

impl Examination {
    pub fn new(report: PostureReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            taken_at: Local::now(),
            report,
        }
    }

    pub fn date_label(&self) -> String {
        self.taken_at.format("%d/%m/%Y").to_string()
    }

    /// Default document name, e.g. `Bilan_Jean_Dupont.pdf`.
    pub fn pdf_file_name(&self) -> String {
        let name: String = self
            .report
            .patient
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("Bilan_{}.pdf", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postura_vision::report::build_report;
    use postura_vision::{Landmark, LandmarkSet, PoseLandmark};

    fn exam(name: &str) -> Examination {
        let set = LandmarkSet::new([Landmark::new(0.5, 0.5); PoseLandmark::COUNT]);
        Examination::new(build_report(&set, name, 170.0, 100))
    }

    #[test]
    fn test_pdf_file_name_is_sanitized() {
        assert_eq!(exam("Jean Dupont").pdf_file_name(), "Bilan_Jean_Dupont.pdf");
        assert_eq!(exam("a/b").pdf_file_name(), "Bilan_a_b.pdf");
        assert_eq!(exam("").pdf_file_name(), "Bilan_Anonyme.pdf");
    }

    #[test]
    fn test_each_examination_gets_its_own_id() {
        assert_ne!(exam("x").id, exam("x").id);
    }

    #[test]
    fn test_date_label_format() {
        let label = exam("x").date_label();
        assert_eq!(label.len(), 10);
        assert_eq!(&label[2..3], "/");
        assert_eq!(&label[5..6], "/");
    }
}
