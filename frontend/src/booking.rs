//! 预约创建流程状态机
//!
//! 纯状态逻辑，不触碰 DOM 和网络。组件层在 (医生, 日期) 对
//! 齐全时按返回的票据发起时段查询，并把结果连同票据一起交回；
//! 票据携带递增序号，迟到的旧查询结果会被直接丢弃，界面始终
//! 反映最后一次选择的组合。

use chrono::NaiveDate;

use medibook_shared::{CreateAppointmentRequest, Doctor, TimeSlot, date};

use crate::error::ApiError;

/// 时段查询票据
///
/// 发起查询时取得，交回结果时校验。序号不匹配说明用户
/// 已切换到新的 (医生, 日期) 组合。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    pub doctor: i64,
    pub date: NaiveDate,
    seq: u64,
}

/// 时段区的展示状态
#[derive(Debug, Clone, PartialEq)]
pub enum SlotsState {
    /// 组合未齐全，不显示时段区
    Empty,
    /// 查询进行中
    Loading,
    /// 查询完成，含不可约时段（展示为禁用）
    Ready(Vec<TimeSlot>),
}

/// 流程阶段（驱动界面分段展示）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    SelectingDoctor,
    SelectingDate,
    SlotsLoading,
    SlotsReady,
    Submitting,
}

/// 预约创建状态
#[derive(Debug, Clone, PartialEq)]
pub struct BookingState {
    pub doctors: Vec<Doctor>,
    pub doctor: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub notes: String,
    pub slots: SlotsState,
    submitting: bool,
    seq: u64,
}

impl BookingState {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self {
            doctors,
            doctor: None,
            date: None,
            time: None,
            notes: String::new(),
            slots: SlotsState::Empty,
            submitting: false,
            seq: 0,
        }
    }

    pub fn phase(&self) -> BookingPhase {
        if self.submitting {
            return BookingPhase::Submitting;
        }
        if self.doctor.is_none() {
            return BookingPhase::SelectingDoctor;
        }
        match self.slots {
            SlotsState::Empty => BookingPhase::SelectingDate,
            SlotsState::Loading => BookingPhase::SlotsLoading,
            SlotsState::Ready(_) => BookingPhase::SlotsReady,
        }
    }

    /// 选择医生
    ///
    /// 已选时段作废；日期已齐全时返回新的查询票据。
    pub fn select_doctor(&mut self, doctor_id: i64) -> Option<SlotTicket> {
        self.doctor = Some(doctor_id);
        self.time = None;
        self.issue_ticket()
    }

    /// 选择就诊日期
    ///
    /// 过去的日期和周末被本地拒绝（当天可选），不发起查询。
    pub fn select_date(
        &mut self,
        today: NaiveDate,
        day: NaiveDate,
    ) -> Result<Option<SlotTicket>, ApiError> {
        if day < today {
            return Err(ApiError::validation("不能选择过去的日期"));
        }
        if date::is_weekend(day) {
            return Err(ApiError::validation("周末不接受预约，请选择工作日"));
        }
        self.date = Some(day);
        self.time = None;
        Ok(self.issue_ticket())
    }

    /// (医生, 日期) 齐全时签发新票据并进入加载态
    fn issue_ticket(&mut self) -> Option<SlotTicket> {
        let (doctor, day) = match (self.doctor, self.date) {
            (Some(doctor), Some(day)) => (doctor, day),
            _ => {
                self.slots = SlotsState::Empty;
                return None;
            }
        };
        self.seq += 1;
        self.slots = SlotsState::Loading;
        Some(SlotTicket {
            doctor,
            date: day,
            seq: self.seq,
        })
    }

    /// 交回查询结果；过期票据被丢弃，返回是否采纳
    pub fn apply_slots(&mut self, ticket: SlotTicket, slots: Vec<TimeSlot>) -> bool {
        if ticket.seq != self.seq {
            log_info!("[Booking] Discarding stale slot result for {}.", ticket.date);
            return false;
        }
        self.slots = SlotsState::Ready(slots);
        true
    }

    /// 交回查询失败；过期票据同样被丢弃
    pub fn slots_failed(&mut self, ticket: SlotTicket) -> bool {
        if ticket.seq != self.seq {
            return false;
        }
        self.slots = SlotsState::Empty;
        true
    }

    /// 选择时段；不可约或未知的时段被忽略
    pub fn select_time(&mut self, time: &str) {
        let available = match &self.slots {
            SlotsState::Ready(slots) => slots
                .iter()
                .any(|slot| slot.time == time && slot.is_available),
            _ => false,
        };
        if available {
            self.time = Some(time.to_string());
        }
    }

    pub fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    /// 组装提交载荷；三要素缺一即为本地校验失败
    pub fn submission(&self) -> Result<CreateAppointmentRequest, ApiError> {
        let doctor = self.doctor.ok_or_else(|| ApiError::validation("请选择医生"))?;
        let day = self.date.ok_or_else(|| ApiError::validation("请选择日期"))?;
        let time = self
            .time
            .as_deref()
            .ok_or_else(|| ApiError::validation("请选择时段"))?;

        Ok(CreateAppointmentRequest {
            doctor,
            date: date::combine(day, time),
            notes: self.notes.clone(),
        })
    }

    pub fn begin_submit(&mut self) {
        self.submitting = true;
    }

    /// 提交失败：回到时段已就绪的状态，所有选择保留
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctors() -> Vec<Doctor> {
        serde_json::from_str(
            r#"[
                {"id": 1, "name": "Chen", "specialization": "内科",
                 "email": "chen@clinic.cn", "phone": "010-0001"},
                {"id": 2, "name": "Zhou", "specialization": "骨科",
                 "email": "zhou@clinic.cn", "phone": "010-0002"}
            ]"#,
        )
        .unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        date::parse_day(s).unwrap()
    }

    fn slots(times: &[(&str, bool)]) -> Vec<TimeSlot> {
        times
            .iter()
            .map(|(t, a)| TimeSlot {
                time: t.to_string(),
                is_available: *a,
            })
            .collect()
    }

    // 2025-03-10 是周一
    const TODAY: &str = "2025-03-10";

    #[test]
    fn no_ticket_until_pair_is_complete() {
        let mut state = BookingState::new(doctors());
        assert_eq!(state.phase(), BookingPhase::SelectingDoctor);

        assert!(state.select_doctor(1).is_none());
        assert_eq!(state.phase(), BookingPhase::SelectingDate);

        let ticket = state.select_date(day(TODAY), day("2025-03-12")).unwrap();
        assert!(ticket.is_some());
        assert_eq!(state.phase(), BookingPhase::SlotsLoading);
    }

    #[test]
    fn past_dates_rejected_today_allowed() {
        let mut state = BookingState::new(doctors());
        state.select_doctor(1);

        let err = state.select_date(day(TODAY), day("2025-03-07")).unwrap_err();
        assert_eq!(err, ApiError::validation("不能选择过去的日期"));
        assert!(state.date.is_none());

        assert!(state.select_date(day(TODAY), day(TODAY)).is_ok());
    }

    #[test]
    fn weekends_rejected_locally() {
        let mut state = BookingState::new(doctors());
        state.select_doctor(1);

        // 2025-03-15 是周六
        let err = state.select_date(day(TODAY), day("2025-03-15")).unwrap_err();
        assert_eq!(err, ApiError::validation("周末不接受预约，请选择工作日"));
        assert_eq!(state.slots, SlotsState::Empty);
    }

    #[test]
    fn stale_slot_results_are_discarded() {
        let mut state = BookingState::new(doctors());
        state.select_doctor(1);
        let first = state
            .select_date(day(TODAY), day("2025-03-12"))
            .unwrap()
            .unwrap();
        // 用户在第一次查询返回前切换了日期
        let second = state
            .select_date(day(TODAY), day("2025-03-13"))
            .unwrap()
            .unwrap();

        assert!(!state.apply_slots(first, slots(&[("09:00", true)])));
        assert_eq!(state.phase(), BookingPhase::SlotsLoading);

        assert!(state.apply_slots(second, slots(&[("10:00", true)])));
        assert_eq!(
            state.slots,
            SlotsState::Ready(slots(&[("10:00", true)]))
        );
    }

    #[test]
    fn switching_doctor_invalidates_chosen_time() {
        let mut state = BookingState::new(doctors());
        state.select_doctor(1);
        let ticket = state
            .select_date(day(TODAY), day("2025-03-12"))
            .unwrap()
            .unwrap();
        state.apply_slots(ticket, slots(&[("09:00", true)]));
        state.select_time("09:00");
        assert_eq!(state.time.as_deref(), Some("09:00"));

        let retry = state.select_doctor(2).unwrap();
        assert!(state.time.is_none());
        assert_eq!(state.phase(), BookingPhase::SlotsLoading);
        assert_ne!(retry, ticket);
    }

    #[test]
    fn unavailable_slots_cannot_be_selected() {
        let mut state = BookingState::new(doctors());
        state.select_doctor(1);
        let ticket = state
            .select_date(day(TODAY), day("2025-03-12"))
            .unwrap()
            .unwrap();
        state.apply_slots(ticket, slots(&[("09:00", false), ("10:00", true)]));

        state.select_time("09:00");
        assert!(state.time.is_none());
        state.select_time("23:00");
        assert!(state.time.is_none());
        state.select_time("10:00");
        assert_eq!(state.time.as_deref(), Some("10:00"));
    }

    #[test]
    fn submission_combines_date_and_time() {
        let mut state = BookingState::new(doctors());
        state.select_doctor(2);
        let ticket = state
            .select_date(day(TODAY), day("2025-03-12"))
            .unwrap()
            .unwrap();
        state.apply_slots(ticket, slots(&[("14:30", true)]));
        state.select_time("14:30");
        state.set_notes("复诊".into());

        let req = state.submission().unwrap();
        assert_eq!(req.doctor, 2);
        assert_eq!(req.date, "2025-03-12T14:30:00");
        assert_eq!(req.notes, "复诊");
    }

    #[test]
    fn submission_requires_all_three_choices() {
        let mut state = BookingState::new(doctors());
        assert_eq!(
            state.submission().unwrap_err(),
            ApiError::validation("请选择医生")
        );

        state.select_doctor(1);
        assert_eq!(
            state.submission().unwrap_err(),
            ApiError::validation("请选择日期")
        );

        let ticket = state
            .select_date(day(TODAY), day("2025-03-12"))
            .unwrap()
            .unwrap();
        state.apply_slots(ticket, slots(&[("09:00", true)]));
        assert_eq!(
            state.submission().unwrap_err(),
            ApiError::validation("请选择时段")
        );
    }

    #[test]
    fn failed_submit_returns_to_ready_with_choices_intact() {
        let mut state = BookingState::new(doctors());
        state.select_doctor(1);
        let ticket = state
            .select_date(day(TODAY), day("2025-03-12"))
            .unwrap()
            .unwrap();
        state.apply_slots(ticket, slots(&[("09:00", true)]));
        state.select_time("09:00");

        state.begin_submit();
        assert_eq!(state.phase(), BookingPhase::Submitting);

        state.submit_failed();
        assert_eq!(state.phase(), BookingPhase::SlotsReady);
        assert_eq!(state.time.as_deref(), Some("09:00"));
    }
}
