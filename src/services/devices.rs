//! Devices service

use std::collections::HashMap;

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        claims::UserClaims,
        device::{CreateDevice, Device, DeviceQuery, DeviceRow, DeviceSummary, UpdateDevice},
        person::PersonRef,
    },
    repository::Repository,
    rules,
};

use super::{export, trim, trim_opt};

#[derive(Clone)]
pub struct DevicesService {
    repository: Repository,
}

impl DevicesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List devices with availability and current holder
    pub async fn list(&self, query: &DeviceQuery) -> AppResult<(Vec<DeviceSummary>, i64)> {
        let (rows, total) = self.repository.devices.list(query).await?;
        let summaries = self.summarize(rows).await?;
        Ok((summaries, total))
    }

    pub async fn get_by_id(&self, asset_num: &str) -> AppResult<DeviceSummary> {
        let row = self.repository.devices.get_by_id(asset_num).await?;
        let mut summaries = self.summarize(vec![row]).await?;
        Ok(summaries.remove(0))
    }

    /// CSV bytes for every device matching the filters
    pub async fn export(&self, query: &DeviceQuery) -> AppResult<Vec<u8>> {
        let devices = self.repository.devices.list_all(query).await?;
        tracing::info!(count = devices.len(), "Exporting devices");
        export::devices_csv(&devices)
    }

    pub async fn create(&self, actor: &UserClaims, mut data: CreateDevice) -> AppResult<Device> {
        trim(&mut data.asset_num);
        trim(&mut data.serial_num);
        trim(&mut data.brand);
        trim(&mut data.model);
        trim(&mut data.os_version);
        data.validate()?;

        let device = self.repository.devices.create(actor, &data).await?;
        tracing::info!(asset_num = %device.asset_num, "Device created");
        Ok(device)
    }

    pub async fn update(
        &self,
        actor: &UserClaims,
        asset_num: &str,
        mut data: UpdateDevice,
    ) -> AppResult<Device> {
        trim_opt(&mut data.serial_num);
        trim_opt(&mut data.brand);
        trim_opt(&mut data.model);
        trim_opt(&mut data.os_version);
        data.validate()?;
        self.repository.devices.update(actor, asset_num, &data).await
    }

    pub async fn delete(&self, actor: &UserClaims, asset_num: &str) -> AppResult<()> {
        self.repository.devices.delete(actor, asset_num).await?;
        tracing::info!(asset_num = %asset_num, "Device deleted");
        Ok(())
    }

    /// Attach free / used_by, derived from the devices' unreturned bookings
    async fn summarize(&self, rows: Vec<DeviceRow>) -> AppResult<Vec<DeviceSummary>> {
        let asset_nums: Vec<String> = rows.iter().map(|r| r.device.asset_num.clone()).collect();
        let active = self.repository.devices.active_bookings(&asset_nums).await?;

        let holder_ids: Vec<i32> = rows
            .iter()
            .filter_map(|r| rules::current_holder(&r.device.asset_num, &active))
            .collect();
        let holders: HashMap<i32, PersonRef> = if holder_ids.is_empty() {
            HashMap::new()
        } else {
            self.repository
                .persons
                .refs(&holder_ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let free = rules::is_free(&row.device.asset_num, &active);
                let used_by = rules::current_holder(&row.device.asset_num, &active)
                    .and_then(|id| holders.get(&id).cloned());
                DeviceSummary {
                    office: row.office,
                    hardware_info: row.device.hardware_info(),
                    software_info: row.device.software_info(),
                    free,
                    used_by,
                    bookings_count: row.bookings_count,
                    device: row.device,
                }
            })
            .collect())
    }
}
