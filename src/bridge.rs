//! Facade over the native VST3 host.
//!
//! The native host itself (plugin loading, audio graph, editor embedding)
//! lives behind the [`NativeVstHost`] trait; transport to it is someone
//! else's concern. What this facade guarantees is the envelope contract:
//! every call returns a serializable `{success, ...}` /
//! `{success: false, error}` shape, and no native-layer failure ever
//! propagates as a Rust error to UI code.
//!
//! The facade keeps a local plugin-metadata map as a UI convenience. It is
//! not authoritative — [`VstBridge::reconcile`] refreshes it from the host —
//! and a side table of fallback status windows covers plugins whose native
//! editor cannot be shown.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

pub type PluginId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub id: PluginId,
    pub name: String,
    pub path: String,
    pub has_ui: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDevice {
    pub id: String,
    pub name: String,
    pub is_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub device_id: Option<String>,
    pub sample_rate: u32,
    pub buffer_size: u32,
}

/// List payloads get a named field so they flatten into the envelope as
/// `{"success": true, "plugins": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginList {
    pub plugins: Vec<PluginInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceList {
    pub devices: Vec<AudioDevice>,
}

/// The uniform result shape of every bridge call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T = ()> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl Envelope<()> {
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// The out-of-scope native collaborator. Errors are plain strings: the
/// native layer is untrusted and its failure detail is only ever displayed.
pub trait NativeVstHost {
    fn load_plugin(&mut self, path: &str) -> std::result::Result<PluginInfo, String>;
    fn unload_plugin(&mut self, id: &str) -> std::result::Result<(), String>;
    fn loaded_plugins(&self) -> std::result::Result<Vec<PluginInfo>, String>;
    fn show_plugin_ui(&mut self, id: &str, parent: Option<&str>)
        -> std::result::Result<(), String>;
    fn hide_plugin_ui(&mut self, id: &str) -> std::result::Result<(), String>;
    fn start_processing(&mut self) -> std::result::Result<(), String>;
    fn stop_processing(&mut self) -> std::result::Result<(), String>;
    fn audio_devices(&self) -> std::result::Result<Vec<AudioDevice>, String>;
    fn initialize_audio(&mut self, config: &AudioConfig) -> std::result::Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUiOutcome {
    /// True when the native editor came up; false means the fallback status
    /// window was opened instead.
    pub native: bool,
}

/// A minimal stand-in window used when the native editor cannot be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackWindow {
    pub plugin_path: String,
    pub title: String,
}

pub struct VstBridge<H: NativeVstHost> {
    host: H,
    /// Convenience cache only; reconcile against the host before trusting.
    plugins: HashMap<PluginId, PluginInfo>,
    fallback_windows: HashMap<String, FallbackWindow>,
}

impl<H: NativeVstHost> VstBridge<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            plugins: HashMap::new(),
            fallback_windows: HashMap::new(),
        }
    }

    pub fn cached_plugins(&self) -> impl Iterator<Item = &PluginInfo> {
        self.plugins.values()
    }

    pub fn load_plugin(&mut self, path: &str) -> Envelope<PluginInfo> {
        match self.host.load_plugin(path) {
            Ok(info) => {
                self.plugins.insert(info.id.clone(), info.clone());
                Envelope::ok(info)
            }
            Err(e) => {
                warn!(path, error = %e, "plugin load failed");
                Envelope::fail(e)
            }
        }
    }

    pub fn unload_plugin(&mut self, id: &str) -> Envelope<()> {
        match self.host.unload_plugin(id) {
            Ok(()) => {
                if let Some(info) = self.plugins.remove(id) {
                    self.fallback_windows.remove(&info.path);
                }
                Envelope::done()
            }
            Err(e) => Envelope::fail(e),
        }
    }

    pub fn get_loaded_plugins(&mut self) -> Envelope<PluginList> {
        match self.host.loaded_plugins() {
            Ok(plugins) => Envelope::ok(PluginList { plugins }),
            Err(e) => Envelope::fail(e),
        }
    }

    /// Re-seed the local cache from the host's authoritative list.
    pub fn reconcile(&mut self) -> Envelope<PluginList> {
        match self.host.loaded_plugins() {
            Ok(plugins) => {
                self.plugins = plugins.iter().map(|p| (p.id.clone(), p.clone())).collect();
                Envelope::ok(PluginList { plugins })
            }
            Err(e) => Envelope::fail(e),
        }
    }

    /// Show a plugin editor, falling back to a status window when the native
    /// UI cannot be shown.
    pub fn show_plugin_ui(&mut self, id: &str, parent: Option<&str>) -> Envelope<ShowUiOutcome> {
        match self.host.show_plugin_ui(id, parent) {
            Ok(()) => Envelope::ok(ShowUiOutcome { native: true }),
            Err(e) => {
                let Some(info) = self.plugins.get(id) else {
                    return Envelope::fail(e);
                };
                warn!(plugin = %id, error = %e, "native UI failed, opening fallback window");
                self.fallback_windows.insert(
                    info.path.clone(),
                    FallbackWindow {
                        plugin_path: info.path.clone(),
                        title: format!("{} (no native UI)", info.name),
                    },
                );
                Envelope::ok(ShowUiOutcome { native: false })
            }
        }
    }

    pub fn hide_plugin_ui(&mut self, id: &str) -> Envelope<()> {
        if let Some(path) = self.plugins.get(id).map(|p| p.path.clone()) {
            if self.fallback_windows.remove(&path).is_some() {
                return Envelope::done();
            }
        }
        match self.host.hide_plugin_ui(id) {
            Ok(()) => Envelope::done(),
            Err(e) => Envelope::fail(e),
        }
    }

    /// Close the fallback window for a plugin path. Idempotent: an absent
    /// entry reports "not found" instead of erroring.
    pub fn close_fallback_window(&mut self, path: &str) -> Envelope<()> {
        if self.fallback_windows.remove(path).is_some() {
            Envelope::done()
        } else {
            Envelope::fail(format!("no fallback window for {}", path))
        }
    }

    pub fn has_fallback_window(&self, path: &str) -> bool {
        self.fallback_windows.contains_key(path)
    }

    pub fn start_processing(&mut self) -> Envelope<()> {
        match self.host.start_processing() {
            Ok(()) => Envelope::done(),
            Err(e) => Envelope::fail(e),
        }
    }

    pub fn stop_processing(&mut self) -> Envelope<()> {
        match self.host.stop_processing() {
            Ok(()) => Envelope::done(),
            Err(e) => Envelope::fail(e),
        }
    }

    pub fn get_audio_devices(&mut self) -> Envelope<DeviceList> {
        match self.host.audio_devices() {
            Ok(devices) => Envelope::ok(DeviceList { devices }),
            Err(e) => Envelope::fail(e),
        }
    }

    pub fn initialize_audio(&mut self, config: &AudioConfig) -> Envelope<()> {
        match self.host.initialize_audio(config) {
            Ok(()) => Envelope::done(),
            Err(e) => Envelope::fail(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted host: loads anything not named "broken", refuses native UI
    /// for plugins flagged headless.
    #[derive(Default)]
    struct MockHost {
        loaded: Vec<PluginInfo>,
        next_id: u32,
        headless: bool,
    }

    impl NativeVstHost for MockHost {
        fn load_plugin(&mut self, path: &str) -> std::result::Result<PluginInfo, String> {
            if path.contains("broken") {
                return Err(format!("could not load module: {}", path));
            }
            self.next_id += 1;
            let info = PluginInfo {
                id: format!("plug-{}", self.next_id),
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.to_string(),
                has_ui: !self.headless,
            };
            self.loaded.push(info.clone());
            Ok(info)
        }

        fn unload_plugin(&mut self, id: &str) -> std::result::Result<(), String> {
            let before = self.loaded.len();
            self.loaded.retain(|p| p.id != id);
            if self.loaded.len() < before {
                Ok(())
            } else {
                Err(format!("unknown plugin: {}", id))
            }
        }

        fn loaded_plugins(&self) -> std::result::Result<Vec<PluginInfo>, String> {
            Ok(self.loaded.clone())
        }

        fn show_plugin_ui(
            &mut self,
            id: &str,
            _parent: Option<&str>,
        ) -> std::result::Result<(), String> {
            if self.headless {
                return Err("editor view creation failed".to_string());
            }
            if self.loaded.iter().any(|p| p.id == id) {
                Ok(())
            } else {
                Err(format!("unknown plugin: {}", id))
            }
        }

        fn hide_plugin_ui(&mut self, _id: &str) -> std::result::Result<(), String> {
            Ok(())
        }

        fn start_processing(&mut self) -> std::result::Result<(), String> {
            Ok(())
        }

        fn stop_processing(&mut self) -> std::result::Result<(), String> {
            Ok(())
        }

        fn audio_devices(&self) -> std::result::Result<Vec<AudioDevice>, String> {
            Ok(vec![AudioDevice {
                id: "default".to_string(),
                name: "Built-in Output".to_string(),
                is_input: false,
            }])
        }

        fn initialize_audio(&mut self, _config: &AudioConfig) -> std::result::Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn native_failure_becomes_error_envelope() {
        let mut bridge = VstBridge::new(MockHost::default());
        let result = bridge.load_plugin("/vst/broken.vst3");
        assert!(!result.success);
        assert!(result.error.unwrap().contains("broken"));
    }

    #[test]
    fn successful_load_populates_the_cache() {
        let mut bridge = VstBridge::new(MockHost::default());
        let result = bridge.load_plugin("/vst/amp.vst3");
        assert!(result.success);
        let id = result.data.unwrap().id;
        assert!(bridge.cached_plugins().any(|p| p.id == id));
    }

    #[test]
    fn cache_is_reconciled_from_the_host() {
        let mut bridge = VstBridge::new(MockHost::default());
        let id = bridge.load_plugin("/vst/amp.vst3").data.unwrap().id;
        // Unload behind the facade's back.
        bridge.host.unload_plugin(&id).unwrap();
        assert!(bridge.cached_plugins().any(|p| p.id == id));
        bridge.reconcile();
        assert!(!bridge.cached_plugins().any(|p| p.id == id));
    }

    #[test]
    fn headless_plugin_gets_a_fallback_window() {
        let mut bridge = VstBridge::new(MockHost {
            headless: true,
            ..MockHost::default()
        });
        let info = bridge.load_plugin("/vst/rack.vst3").data.unwrap();
        let shown = bridge.show_plugin_ui(&info.id, None);
        assert!(shown.success);
        assert!(!shown.data.unwrap().native);
        assert!(bridge.has_fallback_window(&info.path));
    }

    #[test]
    fn closing_fallback_window_is_idempotent() {
        let mut bridge = VstBridge::new(MockHost {
            headless: true,
            ..MockHost::default()
        });
        let info = bridge.load_plugin("/vst/rack.vst3").data.unwrap();
        bridge.show_plugin_ui(&info.id, None);

        assert!(bridge.close_fallback_window(&info.path).success);
        let again = bridge.close_fallback_window(&info.path);
        assert!(!again.success);
        assert!(again.error.unwrap().contains("no fallback window"));
    }

    #[test]
    fn envelope_serializes_to_the_wire_shape() {
        let ok = Envelope::ok(PluginInfo {
            id: "plug-1".to_string(),
            name: "Amp".to_string(),
            path: "/vst/amp.vst3".to_string(),
            has_ui: true,
        });
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], serde_json::json!(true));
        assert_eq!(value["id"], serde_json::json!("plug-1"));
        assert!(value.get("error").is_none());

        let fail: Envelope<()> = Envelope::fail("boom");
        let value = serde_json::to_value(&fail).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["error"], serde_json::json!("boom"));

        let list = Envelope::ok(PluginList { plugins: vec![] });
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["success"], serde_json::json!(true));
        assert_eq!(value["plugins"], serde_json::json!([]));
    }

    #[test]
    fn unload_drops_cache_and_fallback_entries() {
        let mut bridge = VstBridge::new(MockHost {
            headless: true,
            ..MockHost::default()
        });
        let info = bridge.load_plugin("/vst/rack.vst3").data.unwrap();
        bridge.show_plugin_ui(&info.id, None);
        assert!(bridge.unload_plugin(&info.id).success);
        assert!(!bridge.has_fallback_window(&info.path));
        assert_eq!(bridge.cached_plugins().count(), 0);
    }
}
