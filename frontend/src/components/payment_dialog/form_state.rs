//! 支付表单状态
//!
//! 将零散的 signal 整合为 `FormState`，负责持有、重置，以及转换为 `PaymentForm`。

use leptos::prelude::*;

use crate::payment::{PaymentForm, format_card_number, format_cvv, format_expiry};

/// 使用 `RwSignal` 因为它实现了 `Copy`，可直接在闭包与子组件间传递。
#[derive(Clone, Copy)]
pub struct FormState {
    pub first_name: RwSignal<String>,
    pub last_name: RwSignal<String>,
    pub email: RwSignal<String>,
    pub phone: RwSignal<String>,

    // 卡片信息（已格式化）
    pub card_number: RwSignal<String>,
    pub expiry_date: RwSignal<String>,
    pub cvv: RwSignal<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            phone: RwSignal::new(String::new()),
            card_number: RwSignal::new(String::new()),
            expiry_date: RwSignal::new(String::new()),
            cvv: RwSignal::new(String::new()),
        }
    }

    pub fn reset(&self) {
        for field in [
            self.first_name,
            self.last_name,
            self.email,
            self.phone,
            self.card_number,
            self.expiry_date,
            self.cvv,
        ] {
            field.set(String::new());
        }
    }

    /// 输入时即时格式化
    pub fn input_card_number(&self, raw: &str) {
        self.card_number.set(format_card_number(raw));
    }

    pub fn input_expiry(&self, raw: &str) {
        self.expiry_date.set(format_expiry(raw));
    }

    pub fn input_cvv(&self, raw: &str) {
        self.cvv.set(format_cvv(raw));
    }

    pub fn to_form(&self) -> PaymentForm {
        PaymentForm {
            first_name: self.first_name.get_untracked(),
            last_name: self.last_name.get_untracked(),
            email: self.email.get_untracked(),
            phone: self.phone.get_untracked(),
            card_number: self.card_number.get_untracked(),
            expiry_date: self.expiry_date.get_untracked(),
            cvv: self.cvv.get_untracked(),
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
