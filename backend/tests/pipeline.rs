//! End-to-end validation of CSV and workbook uploads.

use chrono::NaiveDate;
use mmp_validator::{
    create_validation_headline, create_validation_summary, validate_file, ParseResult, Severity,
    UploadedFile, ValidationOptions,
};
use rust_xlsxwriter::Workbook;

const TEMPLATE_HEADER: &str = "Hub Office,State,Locality,Site Name,CP Name,Activity at Site,\
Monitoring By,Survey under Master tool,Use Market Diversion Monitoring,Use Warehouse Monitoring,\
Visit Date,Comments";

fn options() -> ValidationOptions {
    ValidationOptions {
        today: NaiveDate::from_ymd_opt(2024, 3, 1),
        quiet: true,
        ..Default::default()
    }
}

async fn validate_csv(content: &str) -> ParseResult {
    let file = UploadedFile::new("plan.csv", content.as_bytes().to_vec());
    validate_file(&file, &options(), None).await
}

fn template_row(site_name: &str) -> String {
    format!(
        "Kassala Hub Office,Kassala,Aroma,{},WFP Partner,Distribution,TPM,KOBO,Yes,No,24-05-2023,routine",
        site_name
    )
}

#[tokio::test]
async fn test_three_row_template_csv() {
    let csv = format!(
        "{}\n{}\n{}\n,,,,,,,,,,,\n",
        TEMPLATE_HEADER,
        template_row("Aroma Clinic"),
        template_row("Aroma School")
    );
    let result = validate_csv(&csv).await;

    assert!(result.is_valid, "{:?}", result.errors);
    assert_eq!(result.records.len(), 2);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.hub_offices, vec!["Kassala Hub Office"]);

    let first = &result.records[0];
    assert_eq!(first["Site Name"], "Aroma Clinic");
    assert_eq!(first["Visit Date"], "24-05-2023");
    assert_eq!(first["OriginalDate"], "2023-05-24");

    assert_eq!(create_validation_headline(&result), "CSV Validation: Successful");
    assert_eq!(
        create_validation_summary(&result),
        "Validation completed successfully. No issues found."
    );
}

#[tokio::test]
async fn test_validation_is_idempotent() {
    let csv = format!(
        "{}\n{}\n{}\n{}\n",
        TEMPLATE_HEADER,
        template_row("Aroma Clinic"),
        template_row("Aroma Clinic"),
        template_row("Aroma Market").replace("24-05-2023", "")
    );

    let first = validate_csv(&csv).await;
    let second = validate_csv(&csv).await;

    assert_eq!(
        serde_json::to_string(&first.records).unwrap(),
        serde_json::to_string(&second.records).unwrap()
    );
    assert_eq!(first.error_summary, second.error_summary);
    assert_eq!(first.warning_summary, second.warning_summary);
    assert_eq!(first.error_summary.categories["duplicate_site"], 1);
    assert_eq!(first.warning_summary.categories["missing_date"], 1);
    assert_eq!(first.records[2]["Visit Date"], "01-03-2024");
}

#[tokio::test]
async fn test_composite_duplicate_ignores_case_and_spacing() {
    let csv = format!(
        "{}\n{}\n{}\n",
        TEMPLATE_HEADER,
        template_row("Aroma Clinic"),
        template_row("  AROMA clinic ")
    );
    let result = validate_csv(&csv).await;

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.severity, Severity::Error);
    assert_eq!(error.category.as_deref(), Some("duplicate_site"));
    assert_eq!(error.row, Some(3));
    assert!(error.message.contains("row 2"));
}

#[tokio::test]
async fn test_warnings_truncated_but_counted() {
    let mut csv = format!("{},Site Code\n", TEMPLATE_HEADER);
    for i in 0..20 {
        let row = template_row(&format!("Site {}", i));
        let row = match i % 3 {
            0 => row.replace("24-05-2023", ""),
            1 => row.replace("Yes,No", "Maybe,No"),
            _ => row,
        };
        let code = if i % 3 == 2 { "bad-code" } else { "" };
        csv.push_str(&format!("{},{}\n", row, code));
    }
    let result = validate_csv(&csv).await;

    // missing_date: 7, invalid_boolean: 7, invalid_site_code: 6
    assert_eq!(result.warning_summary.total, 20);
    assert_eq!(result.warning_summary.categories.len(), 3);
    assert_eq!(result.warning_summary.categories.values().sum::<usize>(), 20);
    assert_eq!(result.warnings.len(), 16);
    assert_eq!(result.warnings[15].category.as_deref(), Some("summary"));
    assert!(result.warnings[15].message.contains("5 more warnings"));

    let summary = create_validation_summary(&result);
    assert!(summary.contains("20 warnings"));
    assert!(summary.contains("• Invalid site codes: 6"));
}

#[tokio::test]
async fn test_quoted_fields_stay_aligned() {
    let csv = format!(
        "{}\n\"Kassala Hub Office\",Kassala,\"Aroma, North\",Aroma Clinic,WFP Partner,Distribution,TPM,KOBO,Yes,No,24-05-2023,\"checked, ok\"\n",
        TEMPLATE_HEADER
    );
    let result = validate_csv(&csv).await;

    assert!(result.is_valid);
    assert_eq!(result.records[0]["Locality"], "Aroma, North");
    assert_eq!(result.records[0]["Comments"], "checked, ok");
}

#[tokio::test]
async fn test_semicolon_latin1_file() {
    let text = "Hub Office;State;Locality;Site Name;CP Name;Visit Date\nKassala;Kassala;Aroma;Café Central;WFP;24-05-2023\n";
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    let file = UploadedFile::new("plan.txt", bytes.into_owned());
    let result = validate_file(&file, &options(), None).await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0]["Locality"], "Aroma");
    assert!(result.records[0]["Site Name"]
        .as_str()
        .unwrap()
        .starts_with("Caf"));
}

#[tokio::test]
async fn test_header_only_file() {
    let result = validate_csv(&format!("{}\n", TEMPLATE_HEADER)).await;

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].category.as_deref(), Some("file_structure"));
    assert!(result.records.is_empty());
    assert!(result.hub_offices.is_empty());
}

#[tokio::test]
async fn test_unreadable_workbook() {
    let file = UploadedFile::new("plan.xlsx", b"not a zip archive".to_vec());
    let result = validate_file(&file, &options(), None).await;

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].category.as_deref(), Some("parse_error"));
    assert!(result.errors[0].message.starts_with("Failed to parse file"));
}

#[tokio::test]
async fn test_workbook_with_title_rows_and_serial_dates() {
    let headers: Vec<&str> = TEMPLATE_HEADER.split(',').collect();
    let date_col = headers.iter().position(|h| *h == "Visit Date").unwrap() as u16;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Plan").unwrap();
    sheet.write_string(0, 0, "Monthly Monitoring Plan - May 2023").unwrap();
    for (c, header) in headers.iter().enumerate() {
        sheet.write_string(2, c as u16, *header).unwrap();
    }
    let rows = [template_row("Aroma Clinic"), template_row("Aroma School")];
    for (r, row) in rows.iter().enumerate() {
        let r = r as u32 + 3;
        for (c, value) in row.split(',').enumerate() {
            let c = c as u16;
            if c == date_col {
                sheet.write_number(r, c, 45070.0).unwrap();
            } else {
                sheet.write_string(r, c, value).unwrap();
            }
        }
    }

    // Neither first row scores, so the first sheet is kept.
    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Fill in the Plan sheet").unwrap();

    let bytes = workbook.save_to_buffer().unwrap();
    let file = UploadedFile::new("plan.xlsx", bytes);
    let result = validate_file(&file, &options(), None).await;

    assert!(result.is_valid, "{:?}", result.errors);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0]["Visit Date"], "24-05-2023");
    assert_eq!(result.records[1]["Site Name"], "Aroma School");
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[tokio::test]
async fn test_from_path_keeps_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.csv");
    std::fs::write(
        &path,
        format!("{}\n{}\n", TEMPLATE_HEADER, template_row("Aroma Clinic")),
    )
    .unwrap();

    let file = UploadedFile::from_path(&path).unwrap();
    assert_eq!(file.name, "upload.csv");

    let result = validate_file(&file, &options(), None).await;
    assert!(result.is_valid);
    assert_eq!(result.records.len(), 1);
}

#[tokio::test]
async fn test_workbook_with_only_blank_rows() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Hub Office").unwrap();
    sheet.write_string(0, 1, "State").unwrap();
    sheet.write_string(2, 1, "   ").unwrap();
    let file = UploadedFile::new("plan.xlsx", workbook.save_to_buffer().unwrap());

    let result = validate_file(&file, &options(), None).await;

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].category.as_deref(), Some("file_structure"));
    assert!(result.records.is_empty());
}

#[tokio::test]
async fn test_progress_closure_borrows_caller_state() {
    let csv = format!(
        "{}\n{}\n{}\n",
        TEMPLATE_HEADER,
        template_row("Aroma Clinic"),
        template_row("Aroma School")
    );
    let file = UploadedFile::new("plan.csv", csv);

    let stages = std::sync::Mutex::new(Vec::new());
    let on_progress = |current: usize, total: usize, stage: &str| {
        stages.lock().unwrap().push(format!("{}/{} {}", current, total, stage));
    };
    let result = validate_file(&file, &options(), Some(&on_progress)).await;
    assert!(result.is_valid);

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first().map(String::as_str), Some("2/2 Read file"));
    assert_eq!(stages.last().map(String::as_str), Some("2/2 Validated 2 of 2 rows"));
}
