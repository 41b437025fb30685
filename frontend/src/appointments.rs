//! 预约列表状态
//!
//! 纯状态逻辑。取消操作按预约 ID 独立跟踪，多条取消可以
//! 并行进行，互不影响各自按钮的禁用态。

use std::collections::HashSet;

use medibook_shared::Appointment;

/// 预约列表与取消进度
#[derive(Debug, Clone, Default)]
pub struct AppointmentsState {
    pub items: Vec<Appointment>,
    cancelling: HashSet<i64>,
}

impl AppointmentsState {
    pub fn new(items: Vec<Appointment>) -> Self {
        Self {
            items,
            cancelling: HashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 标记某条预约进入取消中
    pub fn begin_cancel(&mut self, id: i64) {
        self.cancelling.insert(id);
    }

    /// 取消成功：按 ID 过滤移除该条，其余条目原样保留
    pub fn finish_cancel_ok(&mut self, id: i64) {
        self.cancelling.remove(&id);
        self.items.retain(|a| a.id != id);
    }

    /// 取消失败：条目留在列表中，按钮恢复可用
    pub fn finish_cancel_err(&mut self, id: i64) {
        self.cancelling.remove(&id);
    }

    pub fn is_cancelling(&self, id: i64) -> bool {
        self.cancelling.contains(&id)
    }
}
