//! Spreadsheet export of a day's presence report.
//!
//! The workbook layout is a compatibility contract with the sheets admins
//! already archive: "Sudah Hadir" lists who scanned in with their timestamp,
//! "Belum Hadir" lists registered members who did not.

use crate::error::ServiceResult;
use crate::report::{self, PresenceReport};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use sea_orm::DatabaseConnection;
use util::partition::PartitionPath;

const PRESENT_SHEET: &str = "Sudah Hadir";
const ABSENT_SHEET: &str = "Belum Hadir";

/// Download filename for a day's export, e.g. `Absensi_2026-08-09.xlsx`.
pub fn workbook_filename(path: &PartitionPath) -> String {
    format!("Absensi_{}.xlsx", path.date_string())
}

/// Builds the two-sheet workbook for one day and returns the xlsx bytes.
pub async fn presence_workbook(
    db: &DatabaseConnection,
    path: &PartitionPath,
) -> ServiceResult<Vec<u8>> {
    let report = report::presence_for(db, path).await?;
    let mut workbook = Workbook::new();

    write_present_sheet(workbook.add_worksheet(), &report)?;
    write_absent_sheet(workbook.add_worksheet(), &report)?;

    let bytes = workbook.save_to_buffer()?;
    log::info!(
        "exported {} present / {} absent for {}",
        report.present.len(),
        report.absent.len(),
        report.date
    );
    Ok(bytes)
}

fn write_present_sheet(
    sheet: &mut Worksheet,
    report: &PresenceReport,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    sheet.set_name(PRESENT_SHEET)?;
    write_header(sheet, &["UID", "Nama", "NIM", "Bidang", "Waktu"])?;

    for (i, row) in report.present.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.member_id)?;
        sheet.write_string(r, 1, &row.name)?;
        sheet.write_string(r, 2, &row.nim)?;
        sheet.write_string(r, 3, &row.field)?;
        sheet.write_string(r, 4, &row.recorded_at)?;
    }
    sheet.autofit();
    Ok(())
}

fn write_absent_sheet(
    sheet: &mut Worksheet,
    report: &PresenceReport,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    sheet.set_name(ABSENT_SHEET)?;
    write_header(sheet, &["UID", "Nama", "NIM", "Bidang"])?;

    for (i, member) in report.absent.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &member.id)?;
        sheet.write_string(r, 1, &member.name)?;
        sheet.write_string(r, 2, &member.nim)?;
        sheet.write_string(r, 3, &member.field)?;
    }
    sheet.autofit();
    Ok(())
}

fn write_header(
    sheet: &mut Worksheet,
    columns: &[&str],
) -> Result<(), rust_xlsxwriter::XlsxError> {
    let bold = Format::new().set_bold();
    for (col, title) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    Ok(())
}
