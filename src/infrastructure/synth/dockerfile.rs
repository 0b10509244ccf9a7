//! Container-build descriptor
//!
//! Written into the staged repository only when it has no `Dockerfile`.

use serde_json::Value;

use crate::domain::entities::ApplicationProfile;
use crate::domain::value_objects::Language;

use super::scripts::fallback_start_command;

pub const DOCKERFILE: &str = "Dockerfile";

/// Render a Dockerfile for the profile's language
pub fn render(profile: &ApplicationProfile) -> String {
    let start = profile
        .start_command
        .as_deref()
        .unwrap_or_else(|| fallback_start_command(profile.language));
    let cmd = exec_form(start);
    let port = profile.port;

    match profile.language {
        Language::Python => format!(
            "FROM python:3.11-slim

WORKDIR /app

COPY requirements.txt* Pipfile* ./
RUN if [ -f requirements.txt ]; then pip install --no-cache-dir -r requirements.txt; fi
RUN if [ -f Pipfile ]; then pip install pipenv && pipenv install --system --deploy; fi

COPY . .

ENV PORT={port}
EXPOSE {port}

CMD {cmd}
"
        ),
        lang if lang.is_node() => format!(
            "FROM node:18-alpine

WORKDIR /app

COPY package*.json ./
RUN npm ci --only=production

COPY . .
RUN if [ -f tsconfig.json ]; then npm run build; fi

ENV PORT={port}
EXPOSE {port}

CMD {cmd}
"
        ),
        _ => format!(
            "FROM ubuntu:22.04

WORKDIR /app

COPY . .

ENV PORT={port}
EXPOSE {port}

CMD {cmd}
"
        ),
    }
}

/// JSON array form of a command line
fn exec_form(command: &str) -> String {
    let words: Vec<Value> = split_words(command).into_iter().map(Value::String).collect();
    Value::Array(words).to_string()
}

/// Split on whitespace, keeping single- or double-quoted runs together
fn split_words(command: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in command.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
