//! Localized reply strings.
//!
//! Tables are keyed by language; `fr-FR`, `fr_CA` and `fr` all select French.
//! Unknown languages use English.

/// Every user-facing string a reply or error message needs.
#[derive(Debug, PartialEq, Eq)]
pub struct Messages {
    pub not_found: &'static str,
    pub poster_alt: &'static str,
    pub release_date: &'static str,
    pub first_aired: &'static str,
    pub cast: &'static str,
    pub rating: &'static str,
    pub genres: &'static str,
    pub runtime: &'static str,
    pub minutes: &'static str,
    pub view_on_tmdb: &'static str,
    pub view_on_tvdb: &'static str,
    pub error_api: &'static str,
    pub error_rate_limit: &'static str,
    pub error_configuration: &'static str,
    pub error_validation: &'static str,
    pub error_generic: &'static str,
}

static EN: Messages = Messages {
    not_found: "Sorry, I couldn't find any information about that title.",
    poster_alt: "Poster",
    release_date: "Release Date",
    first_aired: "First Aired",
    cast: "Cast",
    rating: "Rating",
    genres: "Genres",
    runtime: "Runtime",
    minutes: "minutes",
    view_on_tmdb: "View on TMDb",
    view_on_tvdb: "View on TVDb",
    error_api: "The catalog service returned an error: {message}",
    error_rate_limit: "Too many lookups right now, please try again later. ({message})",
    error_configuration: "MediaBot is not configured correctly: {message}",
    error_validation: "Invalid request: {message}",
    error_generic: "Something went wrong: {message}",
};

static ES: Messages = Messages {
    not_found: "Lo siento, no encontré información sobre ese título.",
    poster_alt: "Póster",
    release_date: "Fecha de estreno",
    first_aired: "Primera emisión",
    cast: "Reparto",
    rating: "Puntuación",
    genres: "Géneros",
    runtime: "Duración",
    minutes: "minutos",
    view_on_tmdb: "Ver en TMDb",
    view_on_tvdb: "Ver en TVDb",
    error_api: "El servicio de catálogo devolvió un error: {message}",
    error_rate_limit: "Demasiadas búsquedas ahora mismo, inténtalo más tarde. ({message})",
    error_configuration: "MediaBot no está configurado correctamente: {message}",
    error_validation: "Solicitud no válida: {message}",
    error_generic: "Algo salió mal: {message}",
};

static FR: Messages = Messages {
    not_found: "Désolé, je n'ai trouvé aucune information sur ce titre.",
    poster_alt: "Affiche",
    release_date: "Date de sortie",
    first_aired: "Première diffusion",
    cast: "Distribution",
    rating: "Note",
    genres: "Genres",
    runtime: "Durée",
    minutes: "minutes",
    view_on_tmdb: "Voir sur TMDb",
    view_on_tvdb: "Voir sur TVDb",
    error_api: "Le service de catalogue a renvoyé une erreur : {message}",
    error_rate_limit: "Trop de recherches pour le moment, réessayez plus tard. ({message})",
    error_configuration: "MediaBot n'est pas configuré correctement : {message}",
    error_validation: "Requête invalide : {message}",
    error_generic: "Une erreur est survenue : {message}",
};

static DE: Messages = Messages {
    not_found: "Leider konnte ich keine Informationen zu diesem Titel finden.",
    poster_alt: "Poster",
    release_date: "Erscheinungsdatum",
    first_aired: "Erstausstrahlung",
    cast: "Besetzung",
    rating: "Bewertung",
    genres: "Genres",
    runtime: "Laufzeit",
    minutes: "Minuten",
    view_on_tmdb: "Auf TMDb ansehen",
    view_on_tvdb: "Auf TVDb ansehen",
    error_api: "Der Katalogdienst hat einen Fehler gemeldet: {message}",
    error_rate_limit: "Zu viele Anfragen, bitte später erneut versuchen. ({message})",
    error_configuration: "MediaBot ist nicht richtig konfiguriert: {message}",
    error_validation: "Ungültige Anfrage: {message}",
    error_generic: "Etwas ist schiefgelaufen: {message}",
};

impl Messages {
    /// Table for `locale`, falling back to English.
    pub fn for_locale(locale: &str) -> &'static Messages {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match language.as_str() {
            "es" => &ES,
            "fr" => &FR,
            "de" => &DE,
            _ => &EN,
        }
    }

    /// Substitute `{message}` in one of the error templates.
    pub fn fill(template: &str, message: &str) -> String {
        template.replace("{message}", message)
    }
}
