//! Bilingual reply texts
//!
//! Text is a pure function of the reply message and language. Replies sent
//! before a language was chosen are rendered in both languages.

use std::fmt::Write as _;

use application::{Detection, Reply, ReplyMessage};
use domain::{Language, RegistrationStep, ValidationFailure};

/// Render a reply with its buttons as console text
pub fn render(reply: &Reply) -> String {
    let mut out = match reply.language {
        Some(language) => message_text(&reply.message, language),
        None => Language::ALL
            .iter()
            .map(|language| message_text(&reply.message, *language))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    for choice in &reply.choices {
        let _ = write!(out, "\n  [{}] {}", choice.data, choice.label);
    }
    out
}

/// Text of a single message in `language`
pub fn message_text(message: &ReplyMessage, language: Language) -> String {
    let ru = language == Language::Russian;
    match message {
        ReplyMessage::ChooseLanguage => pick(
            ru,
            "Добро пожаловать! Выберите язык:",
            "Bine ați venit! Alegeți limba:",
        ),
        ReplyMessage::AskGivenName => pick(
            ru,
            "Вы выбрали русский. Пожалуйста, введите ваше имя.",
            "Ați ales română. Vă rugăm să introduceți prenumele.",
        ),
        ReplyMessage::AskSurname => pick(
            ru,
            "Теперь введите вашу фамилию.",
            "Acum introduceți numele de familie.",
        ),
        ReplyMessage::AskPhoneNumber { full_name } => {
            if ru {
                format!(
                    "Спасибо, {full_name}! Теперь введите ваш номер телефона (например: 0XXXXXXXX или +373XXXXXXXX)"
                )
            } else {
                format!(
                    "Mulțumesc, {full_name}! Acum introduceți numărul de telefon (exemplu: 0XXXXXXXX sau +373XXXXXXXX)"
                )
            }
        },
        ReplyMessage::AskAddress => pick(
            ru,
            "Пожалуйста, введите ваш адрес (например: Кишинев, ул. Виктора Крэсеску 100)",
            "Vă rugăm să introduceți adresa (exemplu: Chișinău, str. Victor Crăsescu 100)",
        ),
        ReplyMessage::AskChildCount => pick(
            ru,
            "Сколько детей вы хотите зарегистрировать?",
            "Câți copii doriți să înregistrați?",
        ),
        ReplyMessage::AskChildName { ordinal } => {
            if ru {
                format!("Введите имя и фамилию {ordinal}-го ребенка:")
            } else {
                format!("Introduceți numele și prenumele copilului {ordinal}:")
            }
        },
        ReplyMessage::ChooseSlot => pick(ru, "Выберите дату:", "Selectați data:"),
        ReplyMessage::NoSlotsAvailable => pick(
            ru,
            "К сожалению, нет доступных дат.",
            "Ne pare rău, nu sunt date disponibile.",
        ),
        ReplyMessage::InvalidInput { step, failure } => invalid_input_text(*step, *failure, ru),
        ReplyMessage::Processing => pick(
            ru,
            "Подождите, регистрация обрабатывается...",
            "Vă rugăm să așteptați, înregistrarea se procesează...",
        ),
        ReplyMessage::Registered { slot } => {
            if ru {
                format!("✅ Отлично! Вы зарегистрированы на {slot}")
            } else {
                format!("✅ Perfect! Sunteți înregistrat pentru {slot}")
            }
        },
        ReplyMessage::AlreadyRegistered { slot, detected } => match detected {
            Detection::AtEntry if ru => {
                format!("Вы уже зарегистрированы на {slot}. Повторная регистрация невозможна.")
            },
            Detection::AtEntry => format!(
                "Sunteți deja înregistrat pentru {slot}. Nu vă puteți înregistra din nou."
            ),
            Detection::AtCommit if ru => format!(
                "⚠️ Вы уже зарегистрированы на {slot}. Повторная регистрация невозможна."
            ),
            Detection::AtCommit => format!(
                "⚠️ Sunteți deja înregistrat pentru {slot}. Nu vă puteți înregistra din nou."
            ),
        },
        ReplyMessage::SlotUnavailable { slot } => {
            if ru {
                format!("На {slot} больше нет мест. Выберите другую дату.")
            } else {
                format!("Nu mai sunt locuri pentru {slot}. Alegeți o altă dată.")
            }
        },
        ReplyMessage::StorageFailure => pick(
            ru,
            "❌ Произошла ошибка при регистрации. Пожалуйста, попробуйте позже.",
            "❌ A apărut o eroare la înregistrare. Vă rugăm să încercați mai târziu.",
        ),
    }
}

fn invalid_input_text(step: RegistrationStep, failure: ValidationFailure, ru: bool) -> String {
    match failure {
        ValidationFailure::InvalidPhoneNumber => pick(
            ru,
            "Неверный формат номера. Введите номер в формате 0XXXXXXXX или +373XXXXXXXX",
            "Format greșit. Introduceți numărul în format 0XXXXXXXX sau +373XXXXXXXX",
        ),
        ValidationFailure::InvalidAddress => pick(
            ru,
            "Неверный формат адреса. Минимум 5 символов, буквы и цифры.",
            "Format greșit. Minim 5 caractere, litere și cifre.",
        ),
        ValidationFailure::IncompleteChildName => pick(
            ru,
            "Пожалуйста, введите имя И фамилию ребенка",
            "Vă rugăm să introduceți numele ȘI prenumele copilului",
        ),
        ValidationFailure::InvalidChildCount => pick(
            ru,
            "Выберите количество детей от 1 до 4.",
            "Alegeți numărul de copii de la 1 la 4.",
        ),
        ValidationFailure::EmptyInput if step == RegistrationStep::NameCollection => pick(
            ru,
            "Имя не может быть пустым.",
            "Numele nu poate fi gol.",
        ),
        ValidationFailure::EmptyInput => pick(
            ru,
            "Сообщение не может быть пустым.",
            "Mesajul nu poate fi gol.",
        ),
    }
}

fn pick(ru: bool, russian: &str, romanian: &str) -> String {
    let text = if ru { russian } else { romanian };
    text.to_string()
}
