//! # 服务编排模块
//!
//! ## 设计思路
//!
//! `SelectionRelayService` 只负责流程编排，不直接做像素运算，也不
//! 绑定任何具体宿主。处理链路固定为：
//! 1. 查询激活文档与选区边界
//! 2. 规划请求尺寸（超限时由宿主降采样）
//! 3. 取像素与蒙版缓冲并归一化
//! 4. 合成 RGBA 工作副本
//! 5. （上传时）压白底编码、换令牌、投递
//!
//! ## 实现思路
//!
//! - 宿主与编码器都是泛型参数，测试里用内存假实现注入。
//! - 单次请求内全部顺序 await，各调用独享自己的缓冲。
//! - 记录 `compose/encode/upload/total` 阶段耗时，便于性能诊断。

use std::time::Instant;

use serde::Serialize;

use crate::error::AppError;
use crate::export::{self, ExportFormat, HostEncoder, UploadClient};
use crate::host::{DocumentInfo, ImagingHost, MaskRequest, PixelRequest, SelectionBounds};
use crate::pixel::{self, CompositeOptions, SelectionRgba};
use crate::provider::ProviderKeyClient;
use crate::settings::SettingsStore;

/// 服务依赖的两个远端地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Provider Key 下发地址。
    pub provider_key_url: String,
    /// 上传令牌服务地址。
    pub upload_token_url: String,
}

/// 上传完成返回给面板的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// 选区流水线服务。
///
/// 持有宿主接口、编码器、配置存取与两个远端客户端，对面板暴露
/// 文档查询、选区取图、预览与上传四类入口。
pub struct SelectionRelayService<H, E> {
    host: H,
    encoder: E,
    settings: SettingsStore,
    provider: ProviderKeyClient,
    uploader: UploadClient,
}

impl<H: ImagingHost, E: HostEncoder> SelectionRelayService<H, E> {
    pub fn new(
        host: H,
        encoder: E,
        settings: SettingsStore,
        endpoints: EndpointConfig,
    ) -> Result<Self, AppError> {
        let provider = ProviderKeyClient::new(endpoints.provider_key_url, settings.clone())?;
        let uploader = UploadClient::new(endpoints.upload_token_url)?;
        Ok(Self {
            host,
            encoder,
            settings,
            provider,
            uploader,
        })
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Provider Key 缓存入口，面板可按需强刷。
    pub fn provider(&self) -> &ProviderKeyClient {
        &self.provider
    }

    /// 激活文档信息；无文档时报 `NoActiveDocument`。
    pub async fn document_info(&self) -> Result<DocumentInfo, AppError> {
        self.host
            .active_document()
            .await?
            .ok_or(AppError::NoActiveDocument)
    }

    /// 取激活选区的 RGBA 工作副本；选区是硬性要求。
    pub async fn selection_rgba(
        &self,
        options: &CompositeOptions,
    ) -> Result<SelectionRgba, AppError> {
        let document = self.document_info().await?;
        let bounds = self
            .host
            .selection_bounds(document.id)
            .await?
            .ok_or(AppError::NoActiveSelection)?;

        self.compose_region(&document, bounds, true, options).await
    }

    /// 选区预览：RGBA 保留 alpha，编码为 PNG data URL。
    pub async fn selection_preview_data_url(
        &self,
        options: &CompositeOptions,
    ) -> Result<String, AppError> {
        let image = self.selection_rgba(options).await?;
        Ok(export::png_preview_data_url(&image)?)
    }

    /// 合成、编码并上传当前区域，返回最终资源地址。
    ///
    /// 有选区时按选区出图（蒙版当 alpha），没有选区时退回整幅
    /// 画布且不带蒙版。
    pub async fn upload_region(
        &self,
        format: ExportFormat,
        jpeg_quality: u8,
        options: &CompositeOptions,
    ) -> Result<UploadOutcome, AppError> {
        let total_start = Instant::now();

        let document = self.document_info().await?;
        let (bounds, with_mask) = match self.host.selection_bounds(document.id).await? {
            Some(bounds) => (bounds, true),
            None => (
                SelectionBounds::full_canvas(document.width, document.height),
                false,
            ),
        };

        let compose_start = Instant::now();
        let image = self
            .compose_region(&document, bounds, with_mask, options)
            .await?;
        let compose_elapsed = compose_start.elapsed();

        let encode_start = Instant::now();
        let compressed =
            export::encode_for_upload(&self.encoder, &image, format, jpeg_quality).await?;
        let encode_elapsed = encode_start.elapsed();

        let upload_start = Instant::now();
        let provider_key = self.provider.get(false).await?;
        let asset = self.uploader.upload(&provider_key, &compressed).await?;
        let upload_elapsed = upload_start.elapsed();

        log::info!(
            "✅ 区域上传完成 - compose={}ms encode={}ms upload={}ms total={}ms",
            compose_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            upload_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(UploadOutcome {
            width: image.width,
            height: image.height,
            url: asset.url,
        })
    }

    /// 固定编排：规划尺寸 → 取缓冲 → 归一化 → 合成。
    async fn compose_region(
        &self,
        document: &DocumentInfo,
        bounds: SelectionBounds,
        with_mask: bool,
        options: &CompositeOptions,
    ) -> Result<SelectionRgba, AppError> {
        let width = bounds.width();
        let height = bounds.height();
        let plan = pixel::plan_request_size(width, height);
        if plan.target_size.is_some() {
            log::info!(
                "⚙️ 区域 {}x{} 超出单边上限，按 {}x{} 请求宿主降采样",
                width,
                height,
                plan.out_width,
                plan.out_height
            );
        }

        let pixel_request = PixelRequest::rgb(document.id, bounds, plan.target_size);
        let raw_pixels = self.host.get_pixels(&pixel_request).await?;

        let pixel_count = plan.out_width as usize * plan.out_height as usize;
        let components = pixel::infer_components(raw_pixels.len(), pixel_count)?;
        let rgb = pixel::normalize_to_u8(&raw_pixels, pixel_count * components, "像素")?;

        let mask = if with_mask {
            let mask_request = MaskRequest::new(document.id, bounds, plan.target_size);
            let raw_mask = self.host.get_selection_mask(&mask_request).await?;
            Some(pixel::normalize_to_u8(&raw_mask, pixel_count, "蒙版")?)
        } else {
            None
        };

        let (rgb_min, rgb_max) = pixel::min_max_u8(&rgb);
        match &mask {
            Some(mask) => {
                let (mask_min, mask_max) = pixel::min_max_u8(mask);
                log::debug!(
                    "📝 选区合成 {}x{} comps={} gamma={} rgb=[{},{}] mask=[{},{}]",
                    plan.out_width,
                    plan.out_height,
                    components,
                    options.apply_gamma,
                    rgb_min,
                    rgb_max,
                    mask_min,
                    mask_max
                );
            }
            None => {
                log::debug!(
                    "📝 画布合成 {}x{} comps={} gamma={} rgb=[{},{}] 无蒙版",
                    plan.out_width,
                    plan.out_height,
                    components,
                    options.apply_gamma,
                    rgb_min,
                    rgb_max
                );
            }
        }

        let image = pixel::composite_selection(
            rgb,
            components,
            mask.as_deref(),
            plan.out_width,
            plan.out_height,
            options,
        )?;
        Ok(image)
    }
}
