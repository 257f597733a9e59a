//! Builtin Tier-0 knowledge for TASK programs and services. Curated by
//! staff; the program records can be overridden from a data directory, the
//! cards cannot.

use chrono::NaiveDate;
use task_core::classify::{CATEGORY_KEYWORDS, PROGRAM_KEYWORDS};
use task_core::{GenericIntentCard, ProgramKey, ProgramRecord, Topic};

fn program_keywords(key: ProgramKey) -> Vec<String> {
    PROGRAM_KEYWORDS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, keywords)| keywords.iter().map(|k| k.to_string()).collect())
        .unwrap_or_default()
}

fn category_keywords(topic: Topic) -> &'static [&'static str] {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(candidate, _)| *candidate == topic)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

fn program_card_keywords(key: ProgramKey) -> &'static [&'static str] {
    PROGRAM_KEYWORDS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

pub(crate) fn builtin_programs() -> Vec<ProgramRecord> {
    vec![
        ProgramRecord {
            key: ProgramKey::Sora,
            keywords: program_keywords(ProgramKey::Sora),
            label: "2-Day Unarmed SORA Security Training".to_string(),
            location: "TASK Computer Lab (virtual instruction)".to_string(),
            schedule: "9:00 AM – 5:00 PM (two days)".to_string(),
            duration: "2 days".to_string(),
            purpose_outcomes: "Prepares you to become a licensed security officer in New Jersey; covers all required SORA topics. Staff assist with registration, fingerprinting, and job referrals.".to_string(),
            instructor: Some("TASK staff / partner instructors".to_string()),
            eligibility: "18+; complete application & mandatory info session; no criminal or misdemeanor convictions and no active warrants.".to_string(),
            cost: "Free (covered by TASK).".to_string(),
            next_start_date: None,
            application_window: None,
            signup_link: Some("https://forms.office.com/r/4j7x4kY7wu".to_string()),
            contact_info: Some("(609) 337-1624".to_string()),
            exclusivity_note: Some("If selected for SORA, you cannot enroll in the Emilio Culinary Academy at the same time.".to_string()),
        },
        ProgramRecord {
            key: ProgramKey::Culinary,
            keywords: program_keywords(ProgramKey::Culinary),
            label: "Emilio's Culinary Academy".to_string(),
            location: "Trenton Area Soup Kitchen (Escher St.)".to_string(),
            schedule: "See cohort schedule; 8 weeks instruction + 2-week internship".to_string(),
            duration: "10 weeks".to_string(),
            purpose_outcomes: "Hands-on kitchen instruction, life skills, digital literacy, job readiness; ServSafe® Food Manager certification; job placement support.".to_string(),
            instructor: Some("Experienced chefs and culinary instructors".to_string()),
            eligibility: "18+; cannot accept individuals with convictions for sexual offenses or arson.".to_string(),
            cost: "Free (covered by TASK).".to_string(),
            next_start_date: NaiveDate::from_ymd_opt(2025, 10, 8),
            application_window: Some("Application open Sept 25 – Oct 1".to_string()),
            signup_link: Some("https://forms.office.com/r/Me7avaaXWx".to_string()),
            contact_info: Some("(609) 337-1624".to_string()),
            exclusivity_note: Some("If selected for Culinary, you cannot enroll in the SORA Security Program at the same time.".to_string()),
        },
        ProgramRecord {
            key: ProgramKey::Forklift,
            keywords: program_keywords(ProgramKey::Forklift),
            label: "Forklift Certification Class".to_string(),
            location: "TASK Conference Room".to_string(),
            schedule: "2:00–4:00 PM (one day)".to_string(),
            duration: "1 day".to_string(),
            purpose_outcomes: "Focuses on the written operator test. Many employers provide hands-on training on the job. On-site instruction can be arranged with our certified instructor if your employer requires it.".to_string(),
            instructor: Some("TASK certified instructor".to_string()),
            eligibility: "Open to motivated participants pursuing warehouse/logistics roles.".to_string(),
            cost: "Free.".to_string(),
            next_start_date: None,
            application_window: None,
            signup_link: Some("https://forms.office.com/r/pXe4G2y0JH".to_string()),
            contact_info: Some("(609) 337-1624".to_string()),
            exclusivity_note: None,
        },
    ]
}

pub(crate) fn builtin_cards() -> Vec<GenericIntentCard> {
    vec![
        GenericIntentCard {
            id: "appointments",
            topic: Topic::Appointments,
            keywords: category_keywords(Topic::Appointments),
            body: [
                "To make an appointment, please **call the Social Services Specialist**; we don't accept walk-ins.",
                "• Phone: (609) 337-1624",
                "• Everyone starts with an **Individual Employment Plan (IEP)**. After that, we'll schedule time with the Employment Assistant as needed.",
                "• **Bus tickets** may be provided **only** after an IEP, and only for **interviews/orientations** or the **first two weeks of new employment**.",
                "",
                "Before we book, I'll ask for:",
                "• Your reason/type of appointment",
                "• Preferred date/time windows",
                "• In-person vs. phone/virtual",
                "",
                "If online scheduling works better for you: https://bycell.co/ddncs",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "training_sora",
            topic: Topic::Program(ProgramKey::Sora),
            keywords: program_card_keywords(ProgramKey::Sora),
            body: [
                "🛡️ **2-Day Unarmed SORA Security Training**",
                "• Location: TASK Computer Lab (virtual)",
                "• Time: 9:00 AM – 5:00 PM (two days)",
                "• Outcome: Licensed security officer prep; TASK helps with registration, fingerprinting, job referrals",
                "• Eligibility: 18+, application & info session; **no criminal/misdemeanor convictions and no active warrants**",
                "• Next class: **TBD**",
                "• Apply: https://forms.office.com/r/4j7x4kY7wu",
                "• Training hub: https://bycell.co/ddmtn",
                "• Note: Not eligible to take Culinary at the same time.",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "training_culinary",
            topic: Topic::Program(ProgramKey::Culinary),
            keywords: program_card_keywords(ProgramKey::Culinary),
            body: [
                "👨🏿‍🍳 **Emilio's Culinary Academy** (10 weeks, free)",
                "• 8 weeks instruction + 2-week internship; ServSafe® certification; job supports",
                "• Eligibility: 18+; **cannot accept convictions for sexual offenses or arson**",
                "• Application window: **Sept 25 – Oct 1**",
                "• Next class: **Oct 8, 2025**",
                "• Apply: https://forms.office.com/r/Me7avaaXWx",
                "• Training hub: https://bycell.co/ddmtn",
                "• Note: Not eligible to take SORA at the same time.",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "training_forklift",
            topic: Topic::Program(ProgramKey::Forklift),
            keywords: program_card_keywords(ProgramKey::Forklift),
            body: [
                "🚜 **Forklift Certification Class** (1 day, written test prep)",
                "• When: 2:00–4:00 PM",
                "• Where: TASK Conference Room",
                "• Sign up: https://forms.office.com/r/pXe4G2y0JH",
                "• Note: Most employers train hands-on on the job; on-site instruction can be arranged if needed.",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "events",
            topic: Topic::Events,
            keywords: category_keywords(Topic::Events),
            body: [
                "We don't have upcoming events posted right now. Typical sessions include:",
                "• SORA info sessions",
                "• Resume, interview, communication skills, STAR Method, job search safety",
                "",
                "Updates: https://bycell.co/ddmul",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "employment",
            topic: Topic::Jobs,
            keywords: category_keywords(Topic::Jobs),
            body: [
                "💼 **Employment Services at TASK**",
                "• Career guidance, job search support, resume & interview prep",
                "• Job board: https://bycell.co/ddmtq",
                "• Talk with Employment Services: **(609) 337-1624**",
                "• Suspicious posting? Screenshot and text **(609) 697-6215** or **(609) 697-6166**",
                "• We'll start with an **IEP** appointment.",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "resources",
            topic: Topic::Resources,
            keywords: category_keywords(Topic::Resources),
            body: [
                "🧭 **Community & TASK Resources**",
                "• All resources: https://bycell.co/ddmua",
                "• Other TASK services: https://bycell.co/ddmud",
                "",
                "🧑‍🍳 Meal Service: https://trentonsoupkitchen.org/meal-service/",
                "🤝 Case Management: https://trentonsoupkitchen.org/case-management/ (call the Social Services Specialist first)",
                "🎨 Creative Arts Program: https://trentonsoupkitchen.org/creative-arts-program/",
                "   – Music Mondays 11 am–1 pm",
                "   – Visual Arts Tue 10:30 am–1 pm",
                "   – SHARE Creative Writing Thu 11:30 am–1 pm",
                "📦 Patron Services: hygiene, mail service, OTC meds, clothing; during meal service Mon–Fri 10:30 am–1 pm and Mon–Thu 3:30–5 pm",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "transit",
            topic: Topic::Transit,
            keywords: category_keywords(Topic::Transit),
            body: [
                "🚌 **Trip planning**",
                "• NJ TRANSIT: https://www.njtransit.com/trip-planner-to",
                "• Google Maps (Transit): https://www.google.com/maps/dir/?api=1&origin=72+1/2+Escher+Street,+Trenton,+NJ+08609&travelmode=transit",
                "Tell us where you're starting from and going, and staff can help plan the trip.",
            ]
            .join("\n"),
        },
        GenericIntentCard {
            id: "crisis",
            topic: Topic::Crisis,
            keywords: category_keywords(Topic::Crisis),
            body: [
                "If you're in crisis or feel unsafe:",
                "• **Call 988** (24/7) or 911 for immediate danger",
                "• TASK help lines: **(609) 697-6215** or **(609) 697-6166** (business hours)",
                "You're not alone. We're here to help connect you to support.",
            ]
            .join("\n"),
        },
    ]
}
