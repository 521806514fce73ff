//! CSV export of the device inventory
//!
//! Spreadsheet-friendly output: UTF-8 byte order mark, CRLF line endings,
//! one header row then one row per device.

use crate::{
    error::{AppError, AppResult},
    models::device::Device,
};

pub const EXPORT_FILENAME: &str = "assets.csv";

const BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 6] = ["Brand", "Model", "OS Name", "OS Version", "Serial", "Rooted"];

/// Render devices as CSV bytes
pub fn devices_csv(devices: &[Device]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(BOM.to_vec());

    writer.write_record(HEADER).map_err(csv_error)?;
    for device in devices {
        writer
            .write_record([
                device.brand.as_str(),
                device.model.as_str(),
                device.os_name.as_str(),
                device.os_version.as_str(),
                device.serial_num.as_str(),
                if device.rooted { "True" } else { "False" },
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV export failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::OsName;

    fn device(asset: &str, model: &str, rooted: bool) -> Device {
        Device {
            asset_num: asset.to_string(),
            serial_num: format!("SN-{}", asset),
            brand: "Samsung".to_string(),
            model: model.to_string(),
            os_name: OsName::Android,
            os_version: "14".to_string(),
            office_id: 1,
            rooted,
            passcode: String::new(),
            notes: None,
        }
    }

    #[test]
    fn test_export_layout() {
        let bytes = devices_csv(&[device("D001", "Galaxy S24", true)]).unwrap();
        assert!(bytes.starts_with(BOM));

        let text = std::str::from_utf8(&bytes[BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "Brand,Model,OS Name,OS Version,Serial,Rooted\r\n\
             Samsung,Galaxy S24,ANDROID,14,SN-D001,True\r\n"
        );
    }

    #[test]
    fn test_export_quotes_commas() {
        let bytes = devices_csv(&[device("D002", "Tab, 10in", false)]).unwrap();
        let text = std::str::from_utf8(&bytes[BOM.len()..]).unwrap();
        assert!(text.contains("\"Tab, 10in\""));
        assert!(text.ends_with("False\r\n"));
    }

    #[test]
    fn test_export_empty_has_header() {
        let bytes = devices_csv(&[]).unwrap();
        let text = std::str::from_utf8(&bytes[BOM.len()..]).unwrap();
        assert_eq!(text, "Brand,Model,OS Name,OS Version,Serial,Rooted\r\n");
    }
}
