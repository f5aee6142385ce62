//! Dashboard 渠道（把告警写入终端仪表盘的告警面板）

use crate::notification::channel::Notify;
use crate::tui::TuiGui;
use anyhow::Result;

/// Dashboard 渠道
pub struct DashboardChannel {
    gui: TuiGui,
}

impl DashboardChannel {
    pub fn new(gui: TuiGui) -> Self {
        Self { gui }
    }
}

impl Notify for DashboardChannel {
    fn name(&self) -> &str {
        "dashboard"
    }

    fn notify(&self, message: &str) -> Result<()> {
        self.gui.push_alert(message);
        Ok(())
    }
}
