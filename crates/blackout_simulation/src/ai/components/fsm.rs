//! FSM AI components (state machine, config, patrol route, память восприятия).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Состояния врага. Таймеры живут внутри варианта — выход из state
/// заменяет variant целиком и структурно отменяет его таймеры
/// (никаких stale continuation'ов в чужом state).
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum EnemyState {
    /// Patrolling — идём к текущему waypoint'у маршрута
    Patrolling,

    /// Waiting — стоим на waypoint'е
    Waiting {
        /// Сколько осталось стоять (секунды)
        remaining: f32,
    },

    /// Chasing — преследуем живую позицию игрока
    Chasing {
        /// Debounce потери: None пока игрок виден, Some(t) — обратный
        /// отсчёт до перехода в Searching
        lost_timer: Option<f32>,
    },

    /// Searching — прочёсываем окрестность последней известной позиции
    Searching {
        /// Время в поиске (секунды)
        elapsed: f32,
        /// Центр поиска (last known position или точка investigation)
        anchor: Vec3,
        /// Текущая сэмплированная точка прочёсывания
        leg_target: Option<Vec3>,
    },

    /// Investigating — идём к источнику звука без прямого обнаружения
    Investigating {
        target: Vec3,
    },
}

impl Default for EnemyState {
    fn default() -> Self {
        Self::Patrolling
    }
}

impl EnemyState {
    pub fn kind(&self) -> EnemyStateKind {
        match self {
            EnemyState::Patrolling => EnemyStateKind::Patrolling,
            EnemyState::Waiting { .. } => EnemyStateKind::Waiting,
            EnemyState::Chasing { .. } => EnemyStateKind::Chasing,
            EnemyState::Searching { .. } => EnemyStateKind::Searching,
            EnemyState::Investigating { .. } => EnemyStateKind::Investigating,
        }
    }
}

/// Вариант state без данных — для событий презентации и сравнений
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum EnemyStateKind {
    Patrolling,
    Waiting,
    Chasing,
    Searching,
    Investigating,
}

impl EnemyStateKind {
    /// Pitch шагов для текущего state; None = шаги не звучат
    pub fn footstep_pitch(&self) -> Option<f32> {
        match self {
            EnemyStateKind::Patrolling => Some(1.0),
            EnemyStateKind::Waiting => None,
            EnemyStateKind::Chasing => Some(1.5),
            EnemyStateKind::Searching => Some(1.2),
            EnemyStateKind::Investigating => Some(1.1),
        }
    }
}

/// Параметры врага (скорости, таймауты, дистанции восприятия)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct EnemyConfig {
    /// Скорость патруля (m/s)
    pub patrol_speed: f32,
    /// Скорость преследования (m/s)
    pub chase_speed: f32,
    /// Скорость поиска (m/s)
    pub search_speed: f32,
    /// Скорость движения к источнику звука (m/s)
    pub investigation_speed: f32,

    /// Пауза на waypoint'е (секунды)
    pub wait_time: f32,
    /// Сколько ищем до возврата в патруль (секунды)
    pub search_timeout: f32,
    /// Debounce перед переходом Chase → Search после потери игрока
    pub lost_player_delay: f32,

    /// Дистанция визуального обнаружения (метры)
    pub detection_distance: f32,
    /// Дистанция слуха со спины (метры)
    pub hearing_distance: f32,
    /// Дистанция захвата игрока (метры)
    pub capture_distance: f32,
    /// Полный угол конуса зрения (градусы)
    pub view_angle: f32,
    /// Радиус прочёсывания вокруг anchor'а при поиске (метры)
    pub search_radius: f32,

    /// Arrival-радиус патруля (метры)
    pub patrol_arrival_radius: f32,
    /// Arrival-радиус точки поиска (метры)
    pub search_arrival_radius: f32,
    /// Arrival-радиус investigation (шире патрульного)
    pub investigation_arrival_radius: f32,

    pub enable_detection: bool,
    pub enable_hearing: bool,
    pub enable_line_of_sight: bool,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 1.5,
            chase_speed: 3.5,
            search_speed: 2.0,
            investigation_speed: 2.5,
            wait_time: 2.0,
            search_timeout: 8.0,
            lost_player_delay: 2.0,
            detection_distance: 4.0,
            hearing_distance: 2.0, // слух короче зрения: только вплотную со спины
            capture_distance: 1.2,
            view_angle: 60.0,
            search_radius: 5.0,
            patrol_arrival_radius: 0.5,
            search_arrival_radius: 1.0,
            investigation_arrival_radius: 2.0,
            enable_detection: true,
            enable_hearing: true,
            enable_line_of_sight: true,
        }
    }
}

/// Память восприятия врага (переживает смену state)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PerceptionMemory {
    /// Где игрока видели/слышали в последний раз
    pub last_known_player_position: Option<Vec3>,
    /// Незакрытый investigation-запрос; снимается по прибытии на точку
    pub pending_investigation: Option<Vec3>,
}

/// Циклический маршрут патруля
///
/// Пустой маршрут валиден: враг остаётся на месте, об отсутствии
/// waypoint'ов сообщаем один раз.
#[derive(Component, Debug, Clone, Default)]
pub struct PatrolRoute {
    waypoints: Vec<Vec3>,
    current: usize,
    reported_empty: bool,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self {
            waypoints,
            current: 0,
            reported_empty: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Текущий waypoint; None для пустого маршрута
    pub fn current_waypoint(&self) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        // Индекс всегда валиден по модулю длины
        Some(self.waypoints[self.current % self.waypoints.len()])
    }

    /// Следующий waypoint по циклу
    pub fn advance(&mut self) {
        if !self.waypoints.is_empty() {
            self.current = (self.current + 1) % self.waypoints.len();
        }
    }

    /// Перескочить на ближайший к `from` waypoint (возврат из поиска
    /// идёт не туда где остановились, а туда куда ближе)
    pub fn seek_nearest(&mut self, from: Vec3) {
        let nearest = self
            .waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                from.distance_squared(**a)
                    .total_cmp(&from.distance_squared(**b))
            })
            .map(|(i, _)| i);

        if let Some(index) = nearest {
            self.current = index;
        }
    }

    /// true только при первом вызове — для однократного warning'а
    pub(crate) fn report_empty_once(&mut self) -> bool {
        if self.reported_empty {
            return false;
        }
        self.reported_empty = true;
        true
    }
}
