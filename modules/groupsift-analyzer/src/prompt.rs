//! Prompt assembly for the report. The model writes the report in Polish
//! because the groups it summarizes are Polish.

use anyhow::Result;

use crate::rank::RankedPost;

const SYSTEM_TEMPLATE: &str = "\
Jesteś ekspertem i analitykiem danych z mediów społecznościowych.
Twoim zadaniem jest przeanalizowanie dostarczonych postów (w formacie JSON) i przygotowanie raportu.

INSTRUKCJE UŻYTKOWNIKA:
{user_instructions}

FORMAT ODPOWIEDZI:
Wygeneruj czytelny raport w formacie MARKDOWN.
Raport powinien zawierać:
1. Podsumowanie ogólne (synteza najważniejszych wątków).
2. Ranking / Lista punktowa (zgodnie z instrukcjami użytkownika).
3. Wnioski.

Nie używaj tagów XML, nie zwracaj JSON. Zwróć czysty tekst Markdown.
Piszesz po polsku.
";

pub fn system_prompt(criteria: &str) -> String {
    SYSTEM_TEMPLATE.replace("{user_instructions}", criteria)
}

/// The user message: the ranked posts as compact JSON plus the criteria
/// restated. Compact rather than pretty to keep the token bill down.
pub fn summary_prompt(posts: &[RankedPost], criteria: &str) -> Result<String> {
    let json = serde_json::to_string(posts)?;
    Ok(format!(
        "Oto dane z grupy (posty z liczbą reakcji i komentarzy):\n```json\n{json}\n```\n\nInstrukcje dodatkowe: {criteria}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_are_spliced_into_both_prompts() {
        let system = system_prompt("znajdź pytania o polecenia");
        assert!(system.contains("znajdź pytania o polecenia"));
        assert!(!system.contains("{user_instructions}"));

        let posts = vec![RankedPost {
            text: "Szukam hydraulika".to_string(),
            reactions: 5,
            comments: 2,
            score: 9,
        }];
        let user = summary_prompt(&posts, "znajdź pytania").unwrap();
        assert!(user.contains("\"Szukam hydraulika\""));
        assert!(user.contains("\"reactions\":5"));
        assert!(!user.contains("score")); // internal field stays internal
        assert!(user.contains("Instrukcje dodatkowe: znajdź pytania"));
    }
}
