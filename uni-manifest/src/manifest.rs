//! Typed effective manifest configuration.
//!
//! These structs mirror the resolved tree one-to-one. Every field is
//! populated: the resolver fills anything the user left out from the
//! [`DefaultTable`](crate::DefaultTable) before the tree is deserialized
//! into [`ManifestConfig`]. Serializing a `ManifestConfig` yields the exact
//! key names of the manifest format, so the output can be fed back in as a
//! [`PartialConfig`](crate::PartialConfig).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::DefaultTable;

/// Free-form key/value region.
///
/// Never defaulted, never validated; carried through resolution verbatim.
pub type FreeFormMap = Map<String, Value>;

/// Default timeout, in milliseconds, for each network operation.
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 60_000;

/// Default statistics report interval, in seconds.
pub const DEFAULT_REPORT_INTERVAL: u64 = 10;

/// Default X5 kernel download timeout, in milliseconds.
pub const DEFAULT_X5_TIMEOUT_MS: u64 = 3_000;

/// Keys of the opaque per-platform blocks at the manifest root.
pub const PLATFORM_KEYS: [&str; 9] = [
    "h5",
    "quickapp",
    "mp-weixin",
    "mp-alipay",
    "mp-baidu",
    "mp-toutiao",
    "mp-lark",
    "mp-qq",
    "mp-kuaishou",
];

/// A closed set of string literals.
///
/// Implemented by every enum in the manifest so the schema can declare the
/// enum's domain without repeating the literals.
pub trait ManifestEnum: Copy + 'static {
    /// Every literal in the domain, in declaration order.
    const VALUES: &'static [&'static str];

    /// The literal this variant serializes to.
    fn as_str(self) -> &'static str;
}

macro_rules! manifest_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $lit:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $lit)]
                $variant,
            )+
        }

        impl ManifestEnum for $name {
            const VALUES: &'static [&'static str] = &[$($lit),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $lit,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

manifest_enum! {
    /// uni statistics protocol version.
    StatisticsVersion {
        /// Version 1 statistics.
        V1 => "1",
        /// Version 2 statistics.
        V2 => "2",
    }
}

manifest_enum! {
    /// Allowed screen orientation.
    ScreenOrientation {
        /// Portrait, device upright.
        PortraitPrimary => "portrait-primary",
        /// Portrait, device upside down.
        PortraitSecondary => "portrait-secondary",
        /// Landscape, rotated counter-clockwise.
        LandscapePrimary => "landscape-primary",
        /// Landscape, rotated clockwise.
        LandscapeSecondary => "landscape-secondary",
    }
}

manifest_enum! {
    /// nvue compiler (and style compiler) mode.
    NvueCompiler {
        /// Legacy weex compiler.
        Weex => "weex",
        /// uni-app compiler.
        UniApp => "uni-app",
    }
}

manifest_enum! {
    /// Rendering framework.
    Renderer {
        /// Native rendering.
        Native => "native",
    }
}

manifest_enum! {
    /// Launch mode of an nvue home page.
    NvueLaunchMode {
        /// Regular launch.
        Normal => "normal",
        /// Fast launch.
        Fast => "fast",
    }
}

manifest_enum! {
    /// Initial flex direction for nvue layout.
    FlexDirection {
        /// Left to right.
        Row => "row",
        /// Right to left.
        RowReverse => "row-reverse",
        /// Top to bottom.
        Column => "column",
        /// Bottom to top.
        ColumnReverse => "column-reverse",
    }
}

manifest_enum! {
    /// App run mode.
    RunMode {
        /// Regular run mode.
        Normal => "normal",
        /// Resources are unpacked; required for sub-packages.
        Liberate => "liberate",
    }
}

/// Fully-resolved manifest configuration.
///
/// # Examples
///
/// ```
/// use uni_manifest::{ManifestConfig, RunMode};
///
/// let config = ManifestConfig::default();
/// assert_eq!(config.locale, "auto");
/// assert_eq!(config.network_timeout.request, 60000);
/// assert_eq!(config.app_plus.runmode, RunMode::Normal);
/// assert!(config.h5.is_empty());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManifestConfig {
    /// Application name shown after install.
    pub name: String,
    /// Application identifier assigned by DCloud.
    pub appid: String,
    /// Application description.
    pub description: String,
    /// Default locale.
    pub locale: String,
    /// Version name used for cloud packaging and wgt resources.
    pub version_name: String,
    /// Numeric version code, kept as a string.
    pub version_code: String,
    /// Whether `px` is converted to `rpx`.
    pub transform_px: bool,
    /// Network timeouts.
    pub network_timeout: NetworkTimeout,
    /// Debug mode.
    pub debug: bool,
    /// uni statistics settings.
    pub uni_statistics: UniStatistics,
    /// App-specific settings.
    #[serde(rename = "app-plus")]
    pub app_plus: AppPlus,
    /// H5 platform block.
    pub h5: FreeFormMap,
    /// Quick app platform block.
    pub quickapp: FreeFormMap,
    /// WeChat mini program block.
    #[serde(rename = "mp-weixin")]
    pub mp_weixin: FreeFormMap,
    /// Alipay mini program block.
    #[serde(rename = "mp-alipay")]
    pub mp_alipay: FreeFormMap,
    /// Baidu mini program block.
    #[serde(rename = "mp-baidu")]
    pub mp_baidu: FreeFormMap,
    /// Toutiao mini program block.
    #[serde(rename = "mp-toutiao")]
    pub mp_toutiao: FreeFormMap,
    /// Lark mini program block.
    #[serde(rename = "mp-lark")]
    pub mp_lark: FreeFormMap,
    /// QQ mini program block.
    #[serde(rename = "mp-qq")]
    pub mp_qq: FreeFormMap,
    /// Kuaishou mini program block.
    #[serde(rename = "mp-kuaishou")]
    pub mp_kuaishou: FreeFormMap,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        DefaultTable::global().config().clone()
    }
}

impl ManifestConfig {
    /// Returns the opaque block for a platform key such as `"mp-weixin"`.
    ///
    /// Returns `None` for keys not listed in [`PLATFORM_KEYS`].
    ///
    /// # Examples
    ///
    /// ```
    /// use uni_manifest::ManifestConfig;
    ///
    /// let config = ManifestConfig::default();
    /// assert!(config.platform("mp-weixin").is_some());
    /// assert!(config.platform("app-plus").is_none());
    /// ```
    #[must_use]
    pub fn platform(&self, key: &str) -> Option<&FreeFormMap> {
        match key {
            "h5" => Some(&self.h5),
            "quickapp" => Some(&self.quickapp),
            "mp-weixin" => Some(&self.mp_weixin),
            "mp-alipay" => Some(&self.mp_alipay),
            "mp-baidu" => Some(&self.mp_baidu),
            "mp-toutiao" => Some(&self.mp_toutiao),
            "mp-lark" => Some(&self.mp_lark),
            "mp-qq" => Some(&self.mp_qq),
            "mp-kuaishou" => Some(&self.mp_kuaishou),
            _ => None,
        }
    }
}

/// Timeouts, in milliseconds, for the network APIs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NetworkTimeout {
    /// `uni.request` timeout.
    pub request: u64,
    /// `uni.connectSocket` timeout.
    pub connect_socket: u64,
    /// `uni.uploadFile` timeout.
    pub upload_file: u64,
    /// `uni.downloadFile` timeout.
    pub download_file: u64,
}

/// uni statistics settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UniStatistics {
    /// Whether statistics are collected.
    pub enable: bool,
    /// Statistics protocol version.
    pub version: StatisticsVersion,
    /// Statistics debug mode. Must be off in production.
    pub debug: bool,
    /// Report interval, in seconds.
    pub report_interval: u64,
    /// Collected items.
    pub collect_items: CollectItems,
}

/// Items collected by uni statistics.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CollectItems {
    /// Collect the push client id.
    #[serde(rename = "uniPushClientID")]
    pub uni_push_client_id: bool,
}

/// App-specific (`app-plus`) settings.
///
/// Keys the manifest format does not declare are kept in `extra`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppPlus {
    /// Compiler compatibility settings.
    pub compatible: Compatible,
    /// Splash screen behavior.
    pub splashscreen: Splashscreen,
    /// Allowed orientations, in order of preference.
    pub screen_orientation: Vec<ScreenOrientation>,
    /// Permission modules.
    pub modules: FreeFormMap,
    /// Distribution settings.
    pub distribute: Distribute,
    /// nvue compiler mode.
    pub nvue_compiler: NvueCompiler,
    /// nvue style compiler mode.
    pub nvue_style_compiler: NvueCompiler,
    /// Rendering framework.
    pub renderer: Renderer,
    /// nvue home page launch mode.
    pub nvue_launch_mode: NvueLaunchMode,
    /// Initial nvue layout.
    pub nvue: Nvue,
    /// App-level statistics switch.
    pub uni_statistics: AppStatistics,
    /// Optimization settings.
    pub optimization: Optimization,
    /// Run mode.
    pub runmode: RunMode,
    /// System webview requirements.
    pub web_view: WebView,
    /// Undeclared keys, carried verbatim.
    #[serde(flatten)]
    pub extra: FreeFormMap,
}

/// Compiler compatibility settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Compatible {
    /// Ignore mismatches between runtime and compiler versions.
    pub ignore_version: bool,
    /// Runtime version(s), comma separated.
    pub runtime_version: String,
    /// Compiler version.
    pub compiler_version: String,
}

/// Splash screen behavior.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Splashscreen {
    /// Keep the splash screen until the home page has rendered.
    pub always_show_before_render: bool,
    /// Close the splash screen automatically.
    pub auto_close: bool,
    /// Show a loading indicator.
    pub waiting: bool,
    /// Use the native message box.
    pub use_original_msgbox: bool,
}

/// Distribution settings per OS.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Distribute {
    /// Android settings.
    pub android: FreeFormMap,
    /// iOS settings.
    pub ios: FreeFormMap,
    /// Third-party SDK settings. Only used when packaging.
    pub sdk_configs: FreeFormMap,
}

/// Initial nvue layout.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Nvue {
    /// Direction of flex items.
    #[serde(rename = "flex-direction")]
    pub flex_direction: FlexDirection,
}

/// App-level statistics switch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppStatistics {
    /// Whether statistics are collected in the app.
    pub enable: bool,
}

/// Optimization settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Optimization {
    /// Enable sub-packages. Requires `app-plus.runmode` to be `liberate`.
    pub sub_packages: bool,
}

/// System webview requirements.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WebView {
    /// Minimum webview version; older webviews show a prompt and exit.
    pub min_user_agent_version: String,
    /// X5 kernel settings, only used when the X5 module is enabled.
    pub x5: FreeFormMap,
}

impl WebView {
    /// Reads the X5 kernel settings, if any were supplied.
    ///
    /// The view is lenient: keys that are missing or of the wrong type take
    /// their documented defaults. It never influences resolution.
    ///
    /// # Examples
    ///
    /// ```
    /// use uni_manifest::ManifestConfig;
    ///
    /// let mut config = ManifestConfig::default();
    /// assert!(config.app_plus.web_view.x5_settings().is_none());
    ///
    /// config.app_plus.web_view.x5.insert("showTipsWithoutWifi".into(), true.into());
    /// let x5 = config.app_plus.web_view.x5_settings().unwrap();
    /// assert_eq!(x5.time_out, 3000);
    /// assert!(x5.show_tips_without_wifi);
    /// ```
    #[must_use]
    pub fn x5_settings(&self) -> Option<X5Settings> {
        if self.x5.is_empty() {
            return None;
        }

        let flag = |key: &str| self.x5.get(key).and_then(Value::as_bool).unwrap_or(false);
        Some(X5Settings {
            time_out: self
                .x5
                .get("timeOut")
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_X5_TIMEOUT_MS),
            show_tips_without_wifi: flag("showTipsWithoutWifi"),
            allow_download_without_wifi: flag("allowDownloadWithoutWiFi"),
        })
    }
}

/// Typed view over the X5 kernel block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X5Settings {
    /// Download timeout, in milliseconds.
    pub time_out: u64,
    /// Ask before downloading the kernel on a non-WiFi network.
    pub show_tips_without_wifi: bool,
    /// Download the kernel on a non-WiFi network without asking.
    pub allow_download_without_wifi: bool,
}
