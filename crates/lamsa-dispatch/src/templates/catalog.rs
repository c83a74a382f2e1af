//! Static template catalog keyed by (event, channel).

use std::collections::HashMap;

use lamsa_entity::notification::{Channel, LocalizedText, NotificationEvent, Template};

/// In-memory template catalog.
///
/// Built once at startup; dispatch treats a missing entry as a hard
/// configuration failure rather than falling back to a default.
#[derive(Debug, Default)]
pub struct TemplateCatalog {
    templates: HashMap<(NotificationEvent, Channel), Template>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in bilingual templates for every event.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for spec in BUILTIN {
            catalog.register(spec);
        }
        catalog
    }

    /// Look up the template for one (event, channel) pair.
    pub fn lookup(&self, event: NotificationEvent, channel: Channel) -> Option<&Template> {
        self.templates.get(&(event, channel))
    }

    /// Insert or replace one template.
    pub fn insert(&mut self, template: Template) {
        self.templates
            .insert((template.event, template.channel), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn register(&mut self, spec: &TemplateSpec) {
        // SMS gets body-only content on the wire but shares the copy;
        // every channel carries the same rendering for one event.
        for channel in Channel::ALL {
            self.insert(Template {
                event: spec.event,
                channel,
                title: LocalizedText::new(spec.title_ar, spec.title_en),
                body: LocalizedText::new(spec.body_ar, spec.body_en),
                action_text: spec
                    .action_ar
                    .map(|ar| LocalizedText::new(ar, spec.action_en.unwrap_or(ar))),
                variables: spec.variables.iter().map(|v| v.to_string()).collect(),
                groupable: spec.groupable,
                ttl_seconds: 86_400,
            });
        }
    }
}

struct TemplateSpec {
    event: NotificationEvent,
    title_ar: &'static str,
    title_en: &'static str,
    body_ar: &'static str,
    body_en: &'static str,
    action_ar: Option<&'static str>,
    action_en: Option<&'static str>,
    variables: &'static [&'static str],
    groupable: bool,
}

const BUILTIN: &[TemplateSpec] = &[
    TemplateSpec {
        event: NotificationEvent::BookingCreated,
        title_ar: "طلب حجز جديد",
        title_en: "New booking request",
        body_ar: "لديك طلب حجز جديد من {{customer_name}} لخدمة {{service_name}} بتاريخ {{date}}",
        body_en: "New booking request from {{customer_name}} for {{service_name}} on {{date}}",
        action_ar: Some("عرض الحجز"),
        action_en: Some("View booking"),
        variables: &["customer_name", "service_name", "date"],
        groupable: false,
    },
    TemplateSpec {
        event: NotificationEvent::BookingConfirmed,
        title_ar: "تم تأكيد الحجز",
        title_en: "Booking confirmed",
        body_ar: "تم تأكيد حجزك في {{salon_name}} بتاريخ {{date}} الساعة {{time}}",
        body_en: "Your booking at {{salon_name}} on {{date}} at {{time}} is confirmed",
        action_ar: Some("عرض التفاصيل"),
        action_en: Some("View details"),
        variables: &["salon_name", "date", "time"],
        groupable: false,
    },
    TemplateSpec {
        event: NotificationEvent::BookingCancelled,
        title_ar: "تم إلغاء الحجز",
        title_en: "Booking cancelled",
        body_ar: "تم إلغاء حجزك في {{salon_name}} بتاريخ {{date}}",
        body_en: "Your booking at {{salon_name}} on {{date}} has been cancelled",
        action_ar: None,
        action_en: None,
        variables: &["salon_name", "date"],
        groupable: false,
    },
    TemplateSpec {
        event: NotificationEvent::BookingReminder,
        title_ar: "تذكير بموعدك",
        title_en: "Appointment reminder",
        body_ar: "موعدك في {{salon_name}} غداً الساعة {{time}}",
        body_en: "Your appointment at {{salon_name}} is tomorrow at {{time}}",
        action_ar: Some("عرض الموعد"),
        action_en: Some("View appointment"),
        variables: &["salon_name", "time"],
        groupable: true,
    },
    TemplateSpec {
        event: NotificationEvent::BookingCompleted,
        title_ar: "اكتمل الموعد",
        title_en: "Appointment completed",
        body_ar: "نتمنى أن تكون تجربتك في {{salon_name}} ممتعة",
        body_en: "We hope you enjoyed your visit to {{salon_name}}",
        action_ar: Some("قيّم التجربة"),
        action_en: Some("Rate your visit"),
        variables: &["salon_name"],
        groupable: false,
    },
    TemplateSpec {
        event: NotificationEvent::PaymentReceived,
        title_ar: "تم استلام الدفعة",
        title_en: "Payment received",
        body_ar: "تم استلام دفعة بقيمة {{amount}} {{currency}} لحجز {{service_name}}",
        body_en: "Payment of {{amount}} {{currency}} received for {{service_name}}",
        action_ar: None,
        action_en: None,
        variables: &["amount", "currency", "service_name"],
        groupable: false,
    },
    TemplateSpec {
        event: NotificationEvent::PaymentFailed,
        title_ar: "فشلت عملية الدفع",
        title_en: "Payment failed",
        body_ar: "تعذر إتمام دفعة بقيمة {{amount}} {{currency}}، يرجى المحاولة مرة أخرى",
        body_en: "A payment of {{amount}} {{currency}} could not be completed, please try again",
        action_ar: Some("إعادة المحاولة"),
        action_en: Some("Retry payment"),
        variables: &["amount", "currency"],
        groupable: false,
    },
    TemplateSpec {
        event: NotificationEvent::ReviewReceived,
        title_ar: "تقييم جديد",
        title_en: "New review",
        body_ar: "قام {{customer_name}} بتقييم خدمتك بـ {{rating}} نجوم",
        body_en: "{{customer_name}} rated your service {{rating}} stars",
        action_ar: Some("عرض التقييم"),
        action_en: Some("View review"),
        variables: &["customer_name", "rating"],
        groupable: true,
    },
    TemplateSpec {
        event: NotificationEvent::ReviewReminder,
        title_ar: "شاركنا رأيك",
        title_en: "Share your feedback",
        body_ar: "كيف كانت تجربتك في {{salon_name}}؟ شاركنا تقييمك",
        body_en: "How was your visit to {{salon_name}}? Leave a review",
        action_ar: Some("أضف تقييماً"),
        action_en: Some("Leave a review"),
        variables: &["salon_name"],
        groupable: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_event_and_channel() {
        let catalog = TemplateCatalog::builtin();
        for event in [
            NotificationEvent::BookingCreated,
            NotificationEvent::BookingConfirmed,
            NotificationEvent::BookingCancelled,
            NotificationEvent::BookingReminder,
            NotificationEvent::BookingCompleted,
            NotificationEvent::PaymentReceived,
            NotificationEvent::PaymentFailed,
            NotificationEvent::ReviewReceived,
            NotificationEvent::ReviewReminder,
        ] {
            for channel in Channel::ALL {
                assert!(
                    catalog.lookup(event, channel).is_some(),
                    "missing template for {event} / {channel}"
                );
            }
        }
    }

    #[test]
    fn lookup_misses_return_none() {
        let catalog = TemplateCatalog::new();
        assert!(catalog
            .lookup(NotificationEvent::BookingConfirmed, Channel::Sms)
            .is_none());
    }
}
