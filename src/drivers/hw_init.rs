//! One-shot hardware bring-up: SPI bus and SD-card FAT mount.
//!
//! Uses raw ESP-IDF sys calls; called once from `main()` before the
//! sampling loop starts. A mount failure at startup is fatal — there is
//! nothing to log to without the card. `remount_sd` backs the storage
//! adapter's re-init path after a mid-run open failure.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::pins;

/// Where the FAT volume appears in the VFS.
pub const SD_MOUNT_POINT: &str = "/sdcard";

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    SpiBusFailed(i32),
    SdMountFailed(i32),
    SdUnmountFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiBusFailed(rc) => write!(f, "SPI bus init failed (rc={rc})"),
            Self::SdMountFailed(rc) => write!(f, "SD card mount failed (rc={rc})"),
            Self::SdUnmountFailed(rc) => write!(f, "SD card unmount failed (rc={rc})"),
        }
    }
}

// ── SD card over SPI ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut SD_CARD: *mut sdmmc_card_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
const MOUNT_POINT_C: &core::ffi::CStr = c"/sdcard";

/// Initialize the SPI bus and mount the FAT volume.
#[cfg(target_os = "espidf")]
pub fn mount_sd() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the sampling loop; the
    // remount path runs on the same single thread.
    unsafe {
        let bus_cfg = spi_bus_config_t {
            __bindgen_anon_1: spi_bus_config_t__bindgen_ty_1 {
                mosi_io_num: pins::SD_MOSI_GPIO,
            },
            __bindgen_anon_2: spi_bus_config_t__bindgen_ty_2 {
                miso_io_num: pins::SD_MISO_GPIO,
            },
            sclk_io_num: pins::SD_SCLK_GPIO,
            __bindgen_anon_3: spi_bus_config_t__bindgen_ty_3 { quadwp_io_num: -1 },
            __bindgen_anon_4: spi_bus_config_t__bindgen_ty_4 { quadhd_io_num: -1 },
            ..Default::default()
        };
        let ret = spi_bus_initialize(
            spi_host_device_t_SPI2_HOST,
            &bus_cfg,
            spi_common_dma_t_SPI_DMA_CH_AUTO,
        );
        // ESP_ERR_INVALID_STATE: bus already initialized (remount path).
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::SpiBusFailed(ret));
        }

        mount_volume()
    }
}

/// Unmount and mount again after a storage fault. At most one attempt per
/// failed write — the bounded-retry contract lives in the log writer.
#[cfg(target_os = "espidf")]
pub fn remount_sd() -> Result<(), HwInitError> {
    // SAFETY: single-threaded main-loop access, see mount_sd().
    unsafe {
        let ret = esp_vfs_fat_sdcard_unmount(MOUNT_POINT_C.as_ptr(), SD_CARD);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::SdUnmountFailed(ret));
        }
        SD_CARD = core::ptr::null_mut();
        mount_volume()
    }
}

#[cfg(target_os = "espidf")]
unsafe fn mount_volume() -> Result<(), HwInitError> {
    let mut host = sdmmc_host_t::default();
    host.flags = SDMMC_HOST_FLAG_SPI | SDMMC_HOST_FLAG_DEINIT_ARG;
    host.slot = spi_host_device_t_SPI2_HOST as i32;
    host.max_freq_khz = SDMMC_FREQ_DEFAULT as i32;
    host.init = Some(sdspi_host_init);
    host.set_card_clk = Some(sdspi_host_set_card_clk);
    host.do_transaction = Some(sdspi_host_do_transaction);
    host.io_int_enable = Some(sdspi_host_io_int_enable);
    host.io_int_wait = Some(sdspi_host_io_int_wait);
    host.__bindgen_anon_1.deinit_p = Some(sdspi_host_remove_device);
    host.get_real_freq = Some(sdspi_host_get_real_freq);

    let slot_cfg = sdspi_device_config_t {
        host_id: spi_host_device_t_SPI2_HOST,
        gpio_cs: pins::SD_CS_GPIO,
        gpio_cd: -1,
        gpio_wp: -1,
        gpio_int: -1,
        ..Default::default()
    };

    let mount_cfg = esp_vfs_fat_sdmmc_mount_config_t {
        format_if_mount_failed: false,
        max_files: 4,
        allocation_unit_size: 16 * 1024,
        ..Default::default()
    };

    // SAFETY: pointers outlive the call; SD_CARD is main-thread only.
    let ret = unsafe {
        esp_vfs_fat_sdspi_mount(
            MOUNT_POINT_C.as_ptr(),
            &host,
            &slot_cfg,
            &mount_cfg,
            &raw mut SD_CARD,
        )
    };
    if ret != ESP_OK {
        return Err(HwInitError::SdMountFailed(ret));
    }
    log::info!("hw_init: SD card mounted at {}", SD_MOUNT_POINT);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn mount_sd() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): SD mount skipped");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn remount_sd() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): SD remount skipped");
    Ok(())
}
