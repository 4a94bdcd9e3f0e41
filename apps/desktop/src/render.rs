use colored::{ColoredString, Colorize};
use client_core::{DisplayFrame, ManagerFrame, StatusTone};
use shared::OfficeStatus;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub const INSTALL_HELP: &str = "\
كيفية تثبيت التطبيق

شاشة العرض (تابلت أو شاشة عند الباب):
  1. انسخ الملف التنفيذي mudir إلى الجهاز.
  2. انسخ مجلد الإعدادات (credentials.toml) أو شغّل: mudir setup
  3. اجعل الأمر mudir display يعمل تلقائياً عند تشغيل الجهاز.

لوحة المدير:
  1. شغّل: mudir manager
  2. أو من أي سكربت: mudir manager --set busy --context \"اجتماع\"";

pub const SETUP_INSTRUCTIONS: &str = "\
إعداد قاعدة البيانات

كيف تحصل على البيانات؟
  1. اذهب إلى https://console.firebase.google.com
  2. أنشئ مشروعاً جديداً.
  3. من القائمة اختر Realtime Database وأنشئ قاعدة بيانات (Start in Test Mode).
  4. من إعدادات المشروع (Project Settings) اختر الويب (Web App).
  5. انسخ البيانات (apiKey, projectId, ...) وأدخلها هنا.";

fn paint(text: &str, tone: StatusTone) -> ColoredString {
    match tone {
        StatusTone::Emerald => text.green(),
        StatusTone::Rose => text.red(),
        StatusTone::Indigo => text.blue(),
        StatusTone::Slate => text.bright_black(),
    }
}

pub fn display_screen(frame: &DisplayFrame) -> String {
    format!(
        "{CLEAR_SCREEN}{}    {}\n\n\n    {}\n\n    {}\n\n\n{}\n",
        frame.date.dimmed(),
        frame.clock.bold(),
        paint(frame.label, frame.tone).bold(),
        frame.message,
        format!("آخر تحديث: {}", frame.last_updated).dimmed(),
    )
}

pub fn manager_screen(frame: &ManagerFrame) -> String {
    let mut out = format!(
        "{} {}\n{}\n{}\n",
        "الحالة:".bold(),
        paint(frame.badge, frame.tone).bold(),
        frame.message,
        format!("آخر تحديث: {}", frame.last_updated).dimmed(),
    );
    if let Some(context) = &frame.pending_context {
        out.push_str(&format!("{} {context}\n", "السياق:".bold()));
    }
    if frame.is_composing {
        out.push_str(&format!("{}\n", "جارٍ تحديث الحالة...".yellow()));
    }
    out
}

pub fn status_menu() -> String {
    let mut out = String::new();
    for (index, status) in OfficeStatus::ALL.iter().enumerate() {
        let tone = StatusTone::from(*status);
        out.push_str(&format!(
            "  {} {:<10} {}\n",
            format!("[{}]", index + 1).bold(),
            status.as_wire_str().to_ascii_lowercase(),
            paint(status.manager_label(), tone),
        ));
    }
    out.push_str("  context <text> | clear | install | status | help | quit\n");
    out
}

pub fn role_menu() -> String {
    format!(
        "{}\n  {} لوحة تحكم المدير (manager)\n  {} شاشة العرض (display)\n",
        "نظام إدارة المكتب".bold(),
        "[1]".bold(),
        "[2]".bold(),
    )
}

pub fn notice(text: &str) -> String {
    format!("{}", text.yellow())
}

pub fn failure(text: &str) -> String {
    format!("{}", text.red().bold())
}
