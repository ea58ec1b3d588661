//! Kimoto Gravity Well, in the form Zcoin's Boris Lu tuned it.
//!
//! Walks back from the newest block accumulating a harmonic mean of block
//! difficulty, and stops early once the observed rate leaves the "event
//! horizon" around the target rate. A short look-back reacts fast to large
//! hashrate changes; a long one smooths ordinary noise.

use retarget_types::{Difficulty, RetargetParams};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::arith::mul_div;
use crate::error::EstimatorError;
use crate::estimator::{checked_params, window_index, DifficultyEstimator, RetargetRequest};
use crate::sanitize::monotone_timestamps;

/// Look-back below which the event horizon never stops the walk.
pub const MIN_HORIZON_BLOCKS: u64 = 36;

/// Fixed-point scale of the per-block target `1 / D`.
const TARGET_SCALE: u128 = 1 << 80;

/// Fast limit `1 + 0.7084 (j / 144)^-1.228` in permille, for look-back
/// j = 37..=1050. The slow limit is its reciprocal.
#[rustfmt::skip]
const FAST_LIMIT_PERMILLE: [u16; 1014] = [
    4758, 4637, 4523, 4415, 4313, 4217, 4125, 4038, 3955, 3877, 3802, 3730,
    3662, 3597, 3534, 3475, 3417, 3362, 3310, 3259, 3211, 3164, 3119, 3076,
    3034, 2994, 2955, 2918, 2881, 2846, 2813, 2780, 2748, 2718, 2688, 2659,
    2632, 2604, 2578, 2553, 2528, 2504, 2481, 2458, 2436, 2414, 2394, 2373,
    2353, 2334, 2315, 2297, 2279, 2262, 2245, 2228, 2212, 2196, 2181, 2166,
    2151, 2136, 2122, 2109, 2095, 2082, 2069, 2056, 2044, 2032, 2020, 2009,
    1997, 1986, 1975, 1965, 1954, 1944, 1934, 1924, 1914, 1905, 1895, 1886,
    1877, 1868, 1860, 1851, 1843, 1835, 1827, 1819, 1811, 1803, 1796, 1788,
    1781, 1774, 1767, 1760, 1753, 1746, 1740, 1733, 1727, 1721, 1714, 1708,
    1702, 1697, 1691, 1685, 1679, 1674, 1668, 1663, 1658, 1652, 1647, 1642,
    1637, 1632, 1627, 1622, 1618, 1613, 1608, 1604, 1599, 1595, 1591, 1586,
    1582, 1578, 1574, 1570, 1565, 1562, 1558, 1554, 1550, 1546, 1542, 1539,
    1535, 1531, 1528, 1524, 1521, 1517, 1514, 1511, 1507, 1504, 1501, 1498,
    1494, 1491, 1488, 1485, 1482, 1479, 1476, 1473, 1470, 1467, 1465, 1462,
    1459, 1456, 1454, 1451, 1448, 1446, 1443, 1441, 1438, 1436, 1433, 1431,
    1428, 1426, 1423, 1421, 1419, 1416, 1414, 1412, 1410, 1407, 1405, 1403,
    1401, 1399, 1396, 1394, 1392, 1390, 1388, 1386, 1384, 1382, 1380, 1378,
    1376, 1374, 1373, 1371, 1369, 1367, 1365, 1363, 1362, 1360, 1358, 1356,
    1355, 1353, 1351, 1349, 1348, 1346, 1345, 1343, 1341, 1340, 1338, 1337,
    1335, 1333, 1332, 1330, 1329, 1327, 1326, 1324, 1323, 1322, 1320, 1319,
    1317, 1316, 1314, 1313, 1312, 1310, 1309, 1308, 1306, 1305, 1304, 1302,
    1301, 1300, 1299, 1297, 1296, 1295, 1294, 1292, 1291, 1290, 1289, 1288,
    1286, 1285, 1284, 1283, 1282, 1281, 1280, 1278, 1277, 1276, 1275, 1274,
    1273, 1272, 1271, 1270, 1269, 1268, 1267, 1266, 1265, 1264, 1263, 1262,
    1261, 1260, 1259, 1258, 1257, 1256, 1255, 1254, 1253, 1252, 1251, 1250,
    1249, 1248, 1248, 1247, 1246, 1245, 1244, 1243, 1242, 1241, 1241, 1240,
    1239, 1238, 1237, 1236, 1236, 1235, 1234, 1233, 1232, 1232, 1231, 1230,
    1229, 1228, 1228, 1227, 1226, 1225, 1225, 1224, 1223, 1222, 1222, 1221,
    1220, 1219, 1219, 1218, 1217, 1217, 1216, 1215, 1214, 1214, 1213, 1212,
    1212, 1211, 1210, 1210, 1209, 1208, 1208, 1207, 1206, 1206, 1205, 1205,
    1204, 1203, 1203, 1202, 1201, 1201, 1200, 1200, 1199, 1198, 1198, 1197,
    1197, 1196, 1195, 1195, 1194, 1194, 1193, 1193, 1192, 1191, 1191, 1190,
    1190, 1189, 1189, 1188, 1188, 1187, 1186, 1186, 1185, 1185, 1184, 1184,
    1183, 1183, 1182, 1182, 1181, 1181, 1180, 1180, 1179, 1179, 1178, 1178,
    1177, 1177, 1176, 1176, 1175, 1175, 1174, 1174, 1173, 1173, 1172, 1172,
    1172, 1171, 1171, 1170, 1170, 1169, 1169, 1168, 1168, 1167, 1167, 1167,
    1166, 1166, 1165, 1165, 1164, 1164, 1164, 1163, 1163, 1162, 1162, 1162,
    1161, 1161, 1160, 1160, 1159, 1159, 1159, 1158, 1158, 1157, 1157, 1157,
    1156, 1156, 1156, 1155, 1155, 1154, 1154, 1154, 1153, 1153, 1152, 1152,
    1152, 1151, 1151, 1151, 1150, 1150, 1150, 1149, 1149, 1148, 1148, 1148,
    1147, 1147, 1147, 1146, 1146, 1146, 1145, 1145, 1145, 1144, 1144, 1144,
    1143, 1143, 1143, 1142, 1142, 1142, 1141, 1141, 1141, 1140, 1140, 1140,
    1139, 1139, 1139, 1138, 1138, 1138, 1138, 1137, 1137, 1137, 1136, 1136,
    1136, 1135, 1135, 1135, 1135, 1134, 1134, 1134, 1133, 1133, 1133, 1132,
    1132, 1132, 1132, 1131, 1131, 1131, 1130, 1130, 1130, 1130, 1129, 1129,
    1129, 1129, 1128, 1128, 1128, 1127, 1127, 1127, 1127, 1126, 1126, 1126,
    1126, 1125, 1125, 1125, 1125, 1124, 1124, 1124, 1124, 1123, 1123, 1123,
    1123, 1122, 1122, 1122, 1122, 1121, 1121, 1121, 1121, 1120, 1120, 1120,
    1120, 1119, 1119, 1119, 1119, 1118, 1118, 1118, 1118, 1117, 1117, 1117,
    1117, 1117, 1116, 1116, 1116, 1116, 1115, 1115, 1115, 1115, 1115, 1114,
    1114, 1114, 1114, 1113, 1113, 1113, 1113, 1113, 1112, 1112, 1112, 1112,
    1112, 1111, 1111, 1111, 1111, 1110, 1110, 1110, 1110, 1110, 1109, 1109,
    1109, 1109, 1109, 1108, 1108, 1108, 1108, 1108, 1107, 1107, 1107, 1107,
    1107, 1106, 1106, 1106, 1106, 1106, 1105, 1105, 1105, 1105, 1105, 1105,
    1104, 1104, 1104, 1104, 1104, 1103, 1103, 1103, 1103, 1103, 1103, 1102,
    1102, 1102, 1102, 1102, 1101, 1101, 1101, 1101, 1101, 1101, 1100, 1100,
    1100, 1100, 1100, 1100, 1099, 1099, 1099, 1099, 1099, 1098, 1098, 1098,
    1098, 1098, 1098, 1097, 1097, 1097, 1097, 1097, 1097, 1097, 1096, 1096,
    1096, 1096, 1096, 1096, 1095, 1095, 1095, 1095, 1095, 1095, 1094, 1094,
    1094, 1094, 1094, 1094, 1094, 1093, 1093, 1093, 1093, 1093, 1093, 1092,
    1092, 1092, 1092, 1092, 1092, 1092, 1091, 1091, 1091, 1091, 1091, 1091,
    1091, 1090, 1090, 1090, 1090, 1090, 1090, 1090, 1089, 1089, 1089, 1089,
    1089, 1089, 1089, 1088, 1088, 1088, 1088, 1088, 1088, 1088, 1087, 1087,
    1087, 1087, 1087, 1087, 1087, 1087, 1086, 1086, 1086, 1086, 1086, 1086,
    1086, 1085, 1085, 1085, 1085, 1085, 1085, 1085, 1085, 1084, 1084, 1084,
    1084, 1084, 1084, 1084, 1084, 1083, 1083, 1083, 1083, 1083, 1083, 1083,
    1083, 1082, 1082, 1082, 1082, 1082, 1082, 1082, 1082, 1081, 1081, 1081,
    1081, 1081, 1081, 1081, 1081, 1081, 1080, 1080, 1080, 1080, 1080, 1080,
    1080, 1080, 1079, 1079, 1079, 1079, 1079, 1079, 1079, 1079, 1079, 1078,
    1078, 1078, 1078, 1078, 1078, 1078, 1078, 1078, 1077, 1077, 1077, 1077,
    1077, 1077, 1077, 1077, 1077, 1077, 1076, 1076, 1076, 1076, 1076, 1076,
    1076, 1076, 1076, 1075, 1075, 1075, 1075, 1075, 1075, 1075, 1075, 1075,
    1075, 1074, 1074, 1074, 1074, 1074, 1074, 1074, 1074, 1074, 1074, 1073,
    1073, 1073, 1073, 1073, 1073, 1073, 1073, 1073, 1073, 1072, 1072, 1072,
    1072, 1072, 1072, 1072, 1072, 1072, 1072, 1071, 1071, 1071, 1071, 1071,
    1071, 1071, 1071, 1071, 1071, 1071, 1070, 1070, 1070, 1070, 1070, 1070,
    1070, 1070, 1070, 1070, 1070, 1069, 1069, 1069, 1069, 1069, 1069, 1069,
    1069, 1069, 1069, 1069, 1069, 1068, 1068, 1068, 1068, 1068, 1068, 1068,
    1068, 1068, 1068, 1068, 1067, 1067, 1067, 1067, 1067, 1067, 1067, 1067,
    1067, 1067, 1067, 1067, 1066, 1066, 1066, 1066, 1066, 1066, 1066, 1066,
    1066, 1066, 1066, 1066, 1065, 1065, 1065, 1065, 1065, 1065, 1065, 1065,
    1065, 1065, 1065, 1065, 1065, 1064, 1064, 1064, 1064, 1064, 1064, 1064,
    1064, 1064, 1064, 1064, 1064, 1064, 1063, 1063, 1063, 1063, 1063, 1063,
    1063, 1063, 1063, 1063, 1063, 1063, 1063, 1062, 1062, 1062, 1062, 1062,
    1062, 1062, 1062, 1062, 1062, 1062,
];

/// Fast limit in permille for a look-back of `blocks`; longer look-backs
/// reuse the last entry.
pub fn fast_limit_permille(blocks: u64) -> u64 {
    let first = MIN_HORIZON_BLOCKS + 1;
    let index = blocks.saturating_sub(first) as usize;
    let index = index.min(FAST_LIMIT_PERMILLE.len() - 1);
    u64::from(FAST_LIMIT_PERMILLE[index])
}

/// Kimoto Gravity Well estimator.
#[derive(Clone, Debug)]
pub struct Kgw {
    params: RetargetParams,
}

impl Kgw {
    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Kgw, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Kgw {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Kgw
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let n = window_index(&self.params);
        let t = u128::from(self.params.target_interval);
        let ts = monotone_timestamps(window.timestamps());

        let mut target_sum = 0u128;
        let mut blocks = 0u64;
        let mut actual = 1u128;
        for i in (1..=n).rev() {
            blocks += 1;
            target_sum = target_sum
                .saturating_add(TARGET_SCALE / u128::from(window.block_difficulty(i).max(1)));
            actual = u128::from(ts[n] - ts[i - 1]).max(1);

            if blocks > MIN_HORIZON_BLOCKS {
                let expected = t * u128::from(blocks);
                let fast = u128::from(fast_limit_permille(blocks));
                let too_slow = expected * fast <= 1000 * actual;
                let too_fast = expected * 1000 >= fast * actual;
                if too_slow || too_fast {
                    debug!(blocks, too_fast, "event horizon reached");
                    break;
                }
            }
        }

        // harmonic mean difficulty * expected / actual
        let blocks = u128::from(blocks);
        let next = mul_div(TARGET_SCALE, t * blocks * blocks, target_sum.saturating_mul(actual));
        Ok(Difficulty::from_wide(next))
    }
}
